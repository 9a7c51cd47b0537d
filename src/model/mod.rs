mod mesh;
mod pose;
mod rig;

pub use mesh::*;
pub use pose::*;
pub use rig::*;

use crate::manifest::{BoneNames, Calibration};

/// A loaded figure: renderable geometry plus the state the controls write.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub mesh: MeshData,
    pub rig: Rig,
}

impl LoadedModel {
    /// Model with a rig but no geometry. The controls only need the rig.
    pub fn from_rig(name: &str, rig: Rig) -> Self {
        Self {
            name: name.to_string(),
            mesh: MeshData::default(),
            rig,
        }
    }
}

/// One manifest row after its asset has been loaded.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub location: String,
    pub calibration: Calibration,
    pub bones: BoneNames,
    pub model: LoadedModel,
}
