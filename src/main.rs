use anyhow::Context;
use winit::event_loop::{ControlFlow, EventLoop};

mod app;
mod controls;
mod error;
mod loader;
mod manifest;
mod model;
mod renderer;
mod scene;
mod settings;
mod switcher;
mod ui;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let manifest = std::env::args()
        .nth(1)
        .unwrap_or_else(|| manifest::DEFAULT_MANIFEST.to_string());

    // Everything is fetched before the window opens
    let runtime = tokio::runtime::Runtime::new()?;
    let models = runtime
        .block_on(loader::load_models(&manifest))
        .with_context(|| format!("failed to load models from {manifest}"))?;
    drop(runtime);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = app::AppHandler::new(models);
    event_loop.run_app(&mut handler)?;

    if let Some(e) = handler.take_error() {
        return Err(e.into());
    }
    Ok(())
}
