use crate::controls::ControlPanel;
use crate::error::ViewerError;
use crate::model::ModelEntry;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// Index shown for a raw step counter: `|counter| mod len`.
///
/// The counter itself is never normalized, so stepping back from 0 walks
/// 1, 2, ... rather than wrapping to the last model.
pub fn cycle_index(counter: i64, len: usize) -> usize {
    debug_assert!(len > 0);
    (counter.unsigned_abs() % len as u64) as usize
}

/// Owns the loaded models and keeps exactly one of them attached with a
/// live control panel.
pub struct ModelSwitcher {
    models: Vec<ModelEntry>,
    counter: i64,
    active: usize,
    panel: Option<ControlPanel>,
}

impl ModelSwitcher {
    /// Attach model 0 and bind its panel.
    pub fn new(models: Vec<ModelEntry>, scene: &mut Scene) -> Result<Self, ViewerError> {
        if models.is_empty() {
            return Err(ViewerError::new("empty-model-list"));
        }
        let mut switcher = Self {
            models,
            counter: 0,
            active: 0,
            panel: None,
        };
        switcher.show_model(0, scene);
        Ok(switcher)
    }

    pub fn step(&mut self, step: Step, scene: &mut Scene) -> usize {
        match step {
            Step::Previous => self.counter -= 1,
            Step::Next => self.counter += 1,
        }
        let index = cycle_index(self.counter, self.models.len());
        self.show_model(index, scene);
        index
    }

    /// Jump straight to `index`. Later steps continue from it.
    pub fn select(&mut self, index: usize, scene: &mut Scene) -> Result<(), ViewerError> {
        if index >= self.models.len() {
            return Err(ViewerError::new("model-index-out-of-range")
                .with_arg("index", index)
                .with_arg("len", self.models.len()));
        }
        self.counter = index as i64;
        self.show_model(index, scene);
        Ok(())
    }

    fn show_model(&mut self, index: usize, scene: &mut Scene) {
        scene.detach();
        if let Some(panel) = self.panel.take() {
            panel.dispose();
        }

        self.active = index;
        scene.attach(index);

        let len = self.models.len();
        let entry = &mut self.models[index];
        self.panel = Some(ControlPanel::bind(
            &mut entry.model.rig,
            &entry.calibration,
            &entry.bones,
        ));
        log::info!(
            "Showing model {}/{}: {}",
            index + 1,
            len,
            entry.location
        );
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &ModelEntry {
        &self.models[self.active]
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn panel(&self) -> Option<&ControlPanel> {
        self.panel.as_ref()
    }

    /// Set a control on the active model's panel.
    pub fn set_control(&mut self, name: &str, value: f32) -> bool {
        let Some(panel) = self.panel.as_mut() else {
            return false;
        };
        panel.set(name, value, &mut self.models[self.active].model.rig)
    }

    pub fn show_panel(&mut self, ctx: &egui::Context, open: &mut bool) {
        let Some(panel) = self.panel.as_mut() else {
            return;
        };
        let entry = &mut self.models[self.active];
        let title = format!("{} ({})", entry.model.name, entry.location);
        panel.show(
            ctx,
            &mut entry.model.rig,
            &entry.model.mesh.morph_target_names,
            &title,
            open,
        );
    }
}
