mod render;
#[allow(clippy::module_inception)]
mod renderer;
mod vertex;

pub use renderer::Renderer;
