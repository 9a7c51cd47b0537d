use nalgebra_glm as glm;
use std::ops::RangeInclusive;

use crate::manifest::{BoneNames, Calibration};
use crate::model::Rig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(self) -> glm::Vec3 {
        match self {
            Axis::X => glm::vec3(1.0, 0.0, 0.0),
            Axis::Y => glm::vec3(0.0, 1.0, 0.0),
            Axis::Z => glm::vec3(0.0, 0.0, 1.0),
        }
    }
}

/// Angle extremes in degrees for slider values -1 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub negative: f32,
    pub positive: f32,
}

impl AngleRange {
    pub const HEAD: AngleRange = AngleRange {
        negative: -15.0,
        positive: 15.0,
    };

    pub fn from_calibration(calibration: &Calibration, negative: &str, positive: &str) -> Option<Self> {
        Some(Self {
            negative: calibration.angle(negative)?,
            positive: calibration.angle(positive)?,
        })
    }

    /// Linear map of `x` in [-1, 1] onto [negative, positive] degrees.
    pub fn degrees_at(&self, x: f32) -> f32 {
        (self.positive - self.negative) * (x + 1.0) / 2.0 + self.negative
    }

    pub fn rotation_at(&self, axis: Axis, x: f32) -> glm::Quat {
        glm::quat_angle_axis(self.degrees_at(x).to_radians(), &axis.unit())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneRole {
    Neck,
    LeftEye,
    RightEye,
}

impl BoneRole {
    pub fn name(self, names: &BoneNames) -> &str {
        match self {
            BoneRole::Neck => &names.neck,
            BoneRole::LeftEye => &names.left_eye,
            BoneRole::RightEye => &names.right_eye,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Bounds {
    Calibrated {
        negative: &'static str,
        positive: &'static str,
    },
    Fixed(AngleRange),
}

impl Bounds {
    fn resolve(self, calibration: &Calibration) -> Option<AngleRange> {
        match self {
            Bounds::Calibrated { negative, positive } => {
                AngleRange::from_calibration(calibration, negative, positive)
            }
            Bounds::Fixed(range) => Some(range),
        }
    }
}

pub struct RotationDef {
    pub name: &'static str,
    pub axis: Axis,
    targets: &'static [(BoneRole, Bounds)],
}

pub const ROTATION_CONTROLS: [RotationDef; 5] = [
    RotationDef {
        name: "iris_rotation_x",
        axis: Axis::X,
        targets: &[
            (
                BoneRole::LeftEye,
                Bounds::Calibrated {
                    negative: "LXNA",
                    positive: "LXPA",
                },
            ),
            (
                BoneRole::RightEye,
                Bounds::Calibrated {
                    negative: "RXNA",
                    positive: "RXPA",
                },
            ),
        ],
    },
    RotationDef {
        name: "iris_rotation_y",
        axis: Axis::Y,
        targets: &[
            (
                BoneRole::LeftEye,
                Bounds::Calibrated {
                    negative: "LYNA",
                    positive: "LYPA",
                },
            ),
            (
                BoneRole::RightEye,
                Bounds::Calibrated {
                    negative: "RYNA",
                    positive: "RYPA",
                },
            ),
        ],
    },
    RotationDef {
        name: "head_x",
        axis: Axis::X,
        targets: &[(BoneRole::Neck, Bounds::Fixed(AngleRange::HEAD))],
    },
    RotationDef {
        name: "head_y",
        axis: Axis::Y,
        targets: &[(BoneRole::Neck, Bounds::Fixed(AngleRange::HEAD))],
    },
    RotationDef {
        name: "head_z",
        axis: Axis::Z,
        targets: &[(BoneRole::Neck, Bounds::Fixed(AngleRange::HEAD))],
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTarget {
    pub bone: usize,
    pub range: AngleRange,
}

#[derive(Debug, Clone)]
pub struct RotationControl {
    pub name: &'static str,
    pub axis: Axis,
    pub targets: Vec<RotationTarget>,
    pub value: f32,
}

impl RotationControl {
    /// Resolve bones and bounds. Targets with a missing bone or missing
    /// bounds are dropped; a control left with none is inert.
    pub fn bind(def: &RotationDef, calibration: &Calibration, names: &BoneNames, rig: &Rig) -> Self {
        let targets = def
            .targets
            .iter()
            .filter_map(|&(role, bounds)| {
                let bone_name = role.name(names);
                let Some(bone) = rig.skeleton.find(bone_name) else {
                    log::debug!("{}: no bone named {bone_name}", def.name);
                    return None;
                };
                let Some(range) = bounds.resolve(calibration) else {
                    log::debug!("{}: no calibrated bounds for {bone_name}", def.name);
                    return None;
                };
                Some(RotationTarget { bone, range })
            })
            .collect();

        Self {
            name: def.name,
            axis: def.axis,
            targets,
            value: 0.0,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn range(&self) -> RangeInclusive<f32> {
        if self.is_inert() { 0.0..=0.0 } else { -1.0..=1.0 }
    }

    pub fn set(&mut self, value: f32, rig: &mut Rig) {
        let range = self.range();
        self.value = value.clamp(*range.start(), *range.end());
        self.apply(rig);
    }

    /// Overwrite each target bone's rotation with this control's angle.
    pub fn apply(&self, rig: &mut Rig) {
        for target in &self.targets {
            rig.set_bone_rotation(target.bone, target.range.rotation_at(self.axis, self.value));
        }
    }

    pub fn reset(&self, rig: &mut Rig) {
        for target in &self.targets {
            rig.reset_bone(target.bone);
        }
    }
}
