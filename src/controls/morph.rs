use std::ops::RangeInclusive;

use crate::manifest::Calibration;
use crate::model::Rig;

/// Expression sliders, in panel order.
pub const MORPH_CONTROLS: [&str; 37] = [
    "eyebrow_troubled_left",
    "eyebrow_troubled_right",
    "eyebrow_angry_left",
    "eyebrow_angry_right",
    "eyebrow_serious_left",
    "eyebrow_serious_right",
    "eyebrow_happy_left",
    "eyebrow_happy_right",
    "eyebrow_lowered_left",
    "eyebrow_lowered_right",
    "eyebrow_raised_left",
    "eyebrow_raised_right",
    "eye_wink_left",
    "eye_wink_right",
    "eye_happy_wink_left",
    "eye_happy_wink_right",
    "eye_relaxed_left",
    "eye_relaxed_right",
    "eye_unimpressed_left",
    "eye_unimpressed_right",
    "eye_raised_lower_eyelid_left",
    "eye_raised_lower_eyelid_right",
    "eye_surprised_left",
    "eye_surprised_right",
    "iris_small_left",
    "iris_small_right",
    "mouth_aaa",
    "mouth_iii",
    "mouth_uuu",
    "mouth_eee",
    "mouth_ooo",
    "mouth_delta",
    "mouth_smirk",
    "mouth_raised_corner_left",
    "mouth_raised_corner_right",
    "mouth_lowered_corner_left",
    "mouth_lowered_corner_right",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphBinding {
    Active { index: usize },
    /// Shown on the panel but locked at zero.
    Inert,
}

/// The `_left` name paired with a `_right` control, if it is one.
pub fn left_counterpart(name: &str) -> Option<String> {
    let pos = name.find("right")?;
    Some(format!("{}left", &name[..pos]))
}

/// Decide what a morph slider drives on a model.
///
/// Inert when the calibration has no usable index, the index is outside the
/// rig's influence array, or a `_right` control shares its index with the
/// matching `_left` one (the model has no separate right-side morph).
pub fn bind_morph(name: &str, calibration: &Calibration, morph_target_count: usize) -> MorphBinding {
    let Some(index) = calibration.morph_index(name) else {
        return MorphBinding::Inert;
    };
    if index >= morph_target_count {
        log::warn!("{name}: morph index {index} out of range ({morph_target_count} targets)");
        return MorphBinding::Inert;
    }
    if let Some(left) = left_counterpart(name) {
        if calibration.morph_index(&left) == Some(index) {
            return MorphBinding::Inert;
        }
    }
    MorphBinding::Active { index }
}

#[derive(Debug, Clone)]
pub struct MorphControl {
    pub name: &'static str,
    pub binding: MorphBinding,
    pub value: f32,
}

impl MorphControl {
    pub fn bind(name: &'static str, calibration: &Calibration, rig: &Rig) -> Self {
        Self {
            name,
            binding: bind_morph(name, calibration, rig.morph_target_count()),
            value: 0.0,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.binding == MorphBinding::Inert
    }

    /// Name of the bound morph target, if the asset names its targets.
    pub fn target_name<'a>(&self, target_names: &'a [String]) -> Option<&'a str> {
        match self.binding {
            MorphBinding::Active { index } => target_names.get(index).map(String::as_str),
            MorphBinding::Inert => None,
        }
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        match self.binding {
            MorphBinding::Active { .. } => 0.0..=1.0,
            MorphBinding::Inert => 0.0..=0.0,
        }
    }

    /// Clamp `value` into range, store it and write it through to the rig.
    pub fn set(&mut self, value: f32, rig: &mut Rig) {
        let range = self.range();
        self.value = value.clamp(*range.start(), *range.end());
        self.apply(rig);
    }

    pub fn apply(&self, rig: &mut Rig) {
        if let MorphBinding::Active { index } = self.binding {
            rig.set_influence(index, self.value);
        }
    }
}
