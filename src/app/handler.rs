use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::app::App;
use crate::error::ViewerError;
use crate::model::ModelEntry;

/// Owns the app once the window exists. Models are loaded before the event
/// loop starts and handed over on the first `resumed`.
pub struct AppHandler {
    pub app: Option<App>,
    models: Option<Vec<ModelEntry>>,
    error: Option<ViewerError>,
}

impl AppHandler {
    pub fn new(models: Vec<ModelEntry>) -> Self {
        Self {
            app: None,
            models: Some(models),
            error: None,
        }
    }

    /// The error that stopped the viewer during startup, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<App, ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("morphvis-rs")
            .with_inner_size(winit::dpi::LogicalSize::new(1200.0, 800.0));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let models = self.models.take().unwrap_or_default();
        pollster::block_on(App::new(window, models))
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() || self.error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                log::error!("Failed to start viewer: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = &mut self.app else {
            return;
        };

        if let WindowEvent::RedrawRequested = event {
            if let Err(e) = app.render() {
                log::error!("Render error: {e}");
            }
            return;
        }

        let response = app.handle_event(&event);
        if response.repaint {
            app.window.request_redraw();
        }
        if response.exit {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &self.app {
            app.window.request_redraw();
        }
    }
}
