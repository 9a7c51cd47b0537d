use std::ops::RangeInclusive;

use crate::controls::morph::{MORPH_CONTROLS, MorphControl};
use crate::controls::rotation::{ROTATION_CONTROLS, RotationControl};
use crate::manifest::{BoneNames, Calibration};
use crate::model::Rig;

/// Sliders bound to one model's rig.
///
/// The panel never holds the rig; every write takes it explicitly, and
/// `dispose` consumes the panel so nothing can write after teardown.
#[derive(Debug)]
pub struct ControlPanel {
    morphs: Vec<MorphControl>,
    rotations: Vec<RotationControl>,
}

impl ControlPanel {
    /// Bind every control and push the initial (neutral) values into the rig:
    /// bound morph weights are zeroed and driven bones return to rest.
    pub fn bind(rig: &mut Rig, calibration: &Calibration, bones: &BoneNames) -> Self {
        let morphs: Vec<MorphControl> = MORPH_CONTROLS
            .into_iter()
            .map(|name| MorphControl::bind(name, calibration, rig))
            .collect();
        let rotations: Vec<RotationControl> = ROTATION_CONTROLS
            .iter()
            .map(|def| RotationControl::bind(def, calibration, bones, rig))
            .collect();

        for control in &morphs {
            control.apply(rig);
        }
        for control in &rotations {
            control.reset(rig);
        }

        log::debug!(
            "Bound {}/{} morph controls and {}/{} rotation controls",
            morphs.iter().filter(|c| !c.is_inert()).count(),
            morphs.len(),
            rotations.iter().filter(|c| !c.is_inert()).count(),
            rotations.len()
        );

        Self { morphs, rotations }
    }

    /// Set a control by name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: f32, rig: &mut Rig) -> bool {
        if let Some(control) = self.morphs.iter_mut().find(|c| c.name == name) {
            control.set(value, rig);
            return true;
        }
        if let Some(control) = self.rotations.iter_mut().find(|c| c.name == name) {
            control.set(value, rig);
            return true;
        }
        false
    }

    pub fn value(&self, name: &str) -> Option<f32> {
        self.morphs
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
            .or_else(|| self.rotations.iter().find(|c| c.name == name).map(|c| c.value))
    }

    pub fn range(&self, name: &str) -> Option<RangeInclusive<f32>> {
        self.morphs
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.range())
            .or_else(|| self.rotations.iter().find(|c| c.name == name).map(|c| c.range()))
    }

    pub fn is_inert(&self, name: &str) -> Option<bool> {
        self.range(name).map(|range| range.start() == range.end())
    }

    pub fn control_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.morphs
            .iter()
            .map(|c| c.name)
            .chain(self.rotations.iter().map(|c| c.name))
    }

    /// Draw the panel window; slider changes write straight into `rig`.
    ///
    /// `target_names` are the asset's morph target names, shown as the
    /// tooltip of the slider bound to each target.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        rig: &mut Rig,
        target_names: &[String],
        title: &str,
        open: &mut bool,
    ) {
        egui::Window::new("🎭 Morphs")
            .id(egui::Id::new("morph_controls"))
            .default_width(340.0)
            .resizable(true)
            .vscroll(true)
            .open(open)
            .show(ctx, |ui| {
                ui.label(title);
                ui.separator();

                egui::CollapsingHeader::new("Morphs")
                    .default_open(true)
                    .show(ui, |ui| {
                        for control in &mut self.morphs {
                            let mut value = control.value;
                            let mut response = ui.add_enabled(
                                !control.is_inert(),
                                egui::Slider::new(&mut value, control.range())
                                    .step_by(0.01)
                                    .text(control.name),
                            );
                            if let Some(target) = control.target_name(target_names) {
                                response = response.on_hover_text(target);
                            }
                            if response.changed() {
                                control.set(value, rig);
                            }
                        }
                    });

                egui::CollapsingHeader::new("Rotation")
                    .default_open(true)
                    .show(ui, |ui| {
                        for control in &mut self.rotations {
                            let mut value = control.value;
                            let response = ui.add_enabled(
                                !control.is_inert(),
                                egui::Slider::new(&mut value, control.range())
                                    .step_by(0.01)
                                    .text(control.name),
                            );
                            if response.changed() {
                                control.set(value, rig);
                            }
                        }
                    });
            });
    }

    /// Tear the panel down.
    pub fn dispose(self) {
        log::debug!(
            "Disposed control panel ({} controls)",
            self.morphs.len() + self.rotations.len()
        );
    }
}
