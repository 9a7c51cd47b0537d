use crate::error::ViewerError;
use crate::model::ModelEntry;
use crate::renderer::Renderer;
use crate::scene::{CameraController, Scene};
use crate::settings::Settings;
use crate::switcher::{ModelSwitcher, Step};
use crate::ui::{Ui, UiActions};
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use std::sync::Arc;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::Window;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

impl EventResponse {
    const NONE: Self = Self {
        repaint: false,
        exit: false,
    };
    const EXIT: Self = Self {
        repaint: false,
        exit: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Switch(Step),
    Exit,
}

/// Keyboard shortcuts: `a`/`A` previous model, `d`/`D` next, Escape quits.
pub fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::Escape) => Some(KeyAction::Exit),
        Key::Character(c) if c.eq_ignore_ascii_case("a") => Some(KeyAction::Switch(Step::Previous)),
        Key::Character(c) if c.eq_ignore_ascii_case("d") => Some(KeyAction::Switch(Step::Next)),
        _ => None,
    }
}

pub struct App {
    pub window: Arc<Window>,
    ui: Ui,
    renderer: Renderer,
    scene: Scene,
    switcher: ModelSwitcher,
    camera_controller: CameraController,
    egui_state: State,
    egui_wants_pointer: bool,
    settings: Settings,
}

impl App {
    pub async fn new(window: Arc<Window>, models: Vec<ModelEntry>) -> Result<Self, ViewerError> {
        let settings = Settings::load();
        let renderer = Renderer::new(window.clone()).await?;

        let egui_ctx = renderer.egui_context();
        let egui_state = State::new(
            egui_ctx,
            egui::viewport::ViewportId::ROOT,
            &*window,
            None,
            None,
            None,
        );

        let (width, height) = renderer.size();
        let mut scene = Scene::new(&settings.display, width as f32 / height as f32);
        let switcher = ModelSwitcher::new(models, &mut scene)?;
        let camera_controller =
            CameraController::new(settings.display.min_zoom, settings.display.max_zoom);

        Ok(Self {
            window,
            ui: Ui::new(),
            renderer,
            scene,
            switcher,
            camera_controller,
            egui_state,
            egui_wants_pointer: false,
            settings,
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);
        let egui_consumed = EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        };

        match event {
            WindowEvent::CloseRequested => return EventResponse::EXIT,
            WindowEvent::KeyboardInput { event, .. } => {
                if egui_response.consumed {
                    return egui_consumed;
                }
                if event.state != ElementState::Pressed {
                    return EventResponse::NONE;
                }
                match key_action(&event.logical_key) {
                    Some(KeyAction::Exit) => return EventResponse::EXIT,
                    Some(KeyAction::Switch(step)) => {
                        self.switcher.step(step, &mut self.scene);
                    }
                    None => {}
                }
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.scene.camera.set_aspect(size.width, size.height);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if self.egui_wants_pointer {
                    return egui_consumed;
                }
                self.camera_controller
                    .on_mouse_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.egui_wants_pointer {
                    return egui_consumed;
                }
                let (_, height) = self.renderer.size();
                self.camera_controller.on_mouse_move(
                    (position.x, position.y),
                    height,
                    &mut self.scene.camera,
                );
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if self.egui_wants_pointer {
                    return egui_consumed;
                }
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.02,
                };
                self.camera_controller
                    .on_scroll(lines, &mut self.scene.camera);
            }
            _ => {}
        }

        EventResponse::NONE
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();

        let model_label = format!(
            "{}/{} {}",
            self.switcher.active_index() + 1,
            self.switcher.len(),
            self.switcher.active().location
        );

        let mut actions = UiActions::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            actions = self.ui.show(ctx, &mut self.settings, &model_label);

            let mut open = self.settings.ui.show_controls;
            self.switcher.show_panel(ctx, &mut open);
            if open != self.settings.ui.show_controls {
                self.settings.ui.show_controls = open;
                self.settings.ui.save();
            }
        });

        self.egui_wants_pointer = egui_ctx.wants_pointer_input();

        let UiActions {
            step,
            reset_camera,
            display_changed,
        } = actions;
        if let Some(step) = step {
            self.switcher.step(step, &mut self.scene);
        }
        if reset_camera {
            self.camera_controller.reset(&mut self.scene.camera);
        }
        if display_changed {
            self.scene.apply_display(&self.settings.display);
            self.camera_controller
                .set_zoom_limits(self.settings.display.min_zoom, self.settings.display.max_zoom);
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [self.window.inner_size().width, self.window.inner_size().height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        self.renderer
            .sync_model(self.switcher.active_index(), &self.switcher.active().model);

        self.renderer.render(
            &self.scene,
            &self.settings.outline,
            paint_jobs,
            full_output.textures_delta,
            screen_descriptor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_keys_ignore_case() {
        for (key, step) in [("a", Step::Previous), ("A", Step::Previous), ("d", Step::Next), ("D", Step::Next)] {
            assert_eq!(key_action(&Key::Character(key.into())), Some(KeyAction::Switch(step)));
        }
    }

    #[test]
    fn escape_exits_and_other_keys_do_nothing() {
        assert_eq!(key_action(&Key::Named(NamedKey::Escape)), Some(KeyAction::Exit));
        assert_eq!(key_action(&Key::Character("s".into())), None);
        assert_eq!(key_action(&Key::Named(NamedKey::ArrowLeft)), None);
    }
}
