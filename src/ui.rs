use crate::settings::{DisplaySettings, OutlineSettings, Settings};
use crate::switcher::Step;

/// What the user asked for this frame, applied by the app after the egui pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiActions {
    pub step: Option<Step>,
    pub reset_camera: bool,
    pub display_changed: bool,
}

#[derive(Default)]
pub struct Ui;

impl Ui {
    pub fn new() -> Self {
        Self
    }

    /// Menu bar and the display window. `model_label` names the active model.
    pub fn show(&mut self, ctx: &egui::Context, settings: &mut Settings, model_label: &str) -> UiActions {
        let mut actions = UiActions::default();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("◀ Prev (A)").clicked() {
                    actions.step = Some(Step::Previous);
                }
                if ui.button("Next (D) ▶").clicked() {
                    actions.step = Some(Step::Next);
                }
                ui.label(model_label);

                ui.separator();
                ui.label("📋 Windows:");

                if ui
                    .button(if settings.ui.show_controls {
                        "✅ Morphs"
                    } else {
                        "⬜ Morphs"
                    })
                    .clicked()
                {
                    settings.ui.show_controls = !settings.ui.show_controls;
                    settings.ui.save();
                }

                if ui
                    .button(if settings.ui.show_display_settings {
                        "✅ Display"
                    } else {
                        "⬜ Display"
                    })
                    .clicked()
                {
                    settings.ui.show_display_settings = !settings.ui.show_display_settings;
                    settings.ui.save();
                }
            });
        });

        let was_open = settings.ui.show_display_settings;
        let (reset_camera, display_changed) = show_display_window(ctx, settings);
        actions.reset_camera = reset_camera;
        actions.display_changed = display_changed;
        if was_open != settings.ui.show_display_settings {
            settings.ui.save();
        }

        actions
    }
}

fn show_display_window(ctx: &egui::Context, settings: &mut Settings) -> (bool, bool) {
    let mut reset_camera = false;
    let mut display_changed = false;

    let Settings {
        display,
        outline,
        ui: ui_settings,
    } = settings;

    egui::Window::new("🎨 Display Settings")
        .default_width(300.0)
        .resizable(true)
        .open(&mut ui_settings.show_display_settings)
        .show(ctx, |ui| {
            let mut changed = false;

            ui.label("Background:");
            changed |= ui.color_edit_button_rgb(&mut display.background_color).changed();
            ui.label("Ambient Light:");
            changed |= ui.color_edit_button_rgb(&mut display.ambient_color).changed();
            ui.label("Directional Light:");
            changed |= ui.color_edit_button_rgb(&mut display.light_color).changed();

            ui.separator();
            ui.label("Model Height Offset:");
            changed |= ui
                .add(egui::Slider::new(&mut display.model_offset_y, -30.0..=30.0).suffix(" units"))
                .changed();

            if ui.button("Reset to Defaults").clicked() {
                *display = DisplaySettings::default();
                changed = true;
            }

            if changed {
                display.save();
                display_changed = true;
            }

            ui.separator();
            let mut outline_changed = false;
            outline_changed |= ui.checkbox(&mut outline.enabled, "Outline").changed();
            ui.add_enabled_ui(outline.enabled, |ui| {
                outline_changed |= ui
                    .add(egui::Slider::new(&mut outline.thickness, 0.0..=0.3).text("Thickness"))
                    .changed();
                outline_changed |= ui.color_edit_button_rgb(&mut outline.color).changed();
            });
            if ui.button("Default Outline").clicked() {
                *outline = OutlineSettings::default();
                outline_changed = true;
            }
            if outline_changed {
                outline.save();
            }

            ui.separator();

            if ui.button("Reset Camera").clicked() {
                reset_camera = true;
            }
        });

    (reset_camera, display_changed)
}
