use nalgebra_glm as glm;

use crate::model::mesh::Node;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub rest_rotation: glm::Quat,
    /// Current local rotation, rest pose included.
    pub rotation: glm::Quat,
}

/// One bone per scene node, indexed like `MeshData::nodes`.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self {
            bones: nodes
                .iter()
                .map(|node| Bone {
                    name: node.name.clone(),
                    rest_rotation: node.rotation,
                    rotation: node.rotation,
                })
                .collect(),
        }
    }

    /// Bones with identity rest pose, for rigs built without an asset.
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            bones: names
                .iter()
                .map(|name| Bone {
                    name: name.to_string(),
                    rest_rotation: glm::quat_identity(),
                    rotation: glm::quat_identity(),
                })
                .collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }
}

/// Mutable pose state of a model: morph weights and bone rotations.
///
/// Every write bumps `revision` so the renderer knows when to re-pose.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    pub morph_target_influences: Vec<f32>,
    pub skeleton: Skeleton,
    revision: u64,
}

impl Rig {
    pub fn new(morph_target_count: usize, skeleton: Skeleton) -> Self {
        Self {
            morph_target_influences: vec![0.0; morph_target_count],
            skeleton,
            revision: 0,
        }
    }

    pub fn morph_target_count(&self) -> usize {
        self.morph_target_influences.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns false if `index` is outside the influence array.
    pub fn set_influence(&mut self, index: usize, weight: f32) -> bool {
        let Some(slot) = self.morph_target_influences.get_mut(index) else {
            return false;
        };
        *slot = weight;
        self.revision += 1;
        true
    }

    /// Replace the bone's local rotation with `rotation` applied on top of
    /// its rest pose. Earlier rotations set through here are discarded.
    pub fn set_bone_rotation(&mut self, bone: usize, rotation: glm::Quat) -> bool {
        let Some(bone) = self.skeleton.bones.get_mut(bone) else {
            return false;
        };
        bone.rotation = glm::quat_normalize(&(bone.rest_rotation * rotation));
        self.revision += 1;
        true
    }

    pub fn reset_bone(&mut self, bone: usize) -> bool {
        let Some(bone) = self.skeleton.bones.get_mut(bone) else {
            return false;
        };
        bone.rotation = bone.rest_rotation;
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influences_start_at_zero() {
        let rig = Rig::new(5, Skeleton::default());
        assert_eq!(rig.morph_target_influences, vec![0.0; 5]);
        assert_eq!(rig.revision(), 0);
    }

    #[test]
    fn out_of_range_influence_is_ignored() {
        let mut rig = Rig::new(2, Skeleton::default());
        assert!(!rig.set_influence(2, 1.0));
        assert_eq!(rig.revision(), 0);
        assert!(rig.set_influence(1, 0.25));
        assert_eq!(rig.morph_target_influences, vec![0.0, 0.25]);
        assert_eq!(rig.revision(), 1);
    }

    #[test]
    fn bone_rotation_overwrites_previous_rotation() {
        let mut rig = Rig::new(0, Skeleton::from_names(&["首"]));
        let neck = rig.skeleton.find("首").unwrap();
        let x = glm::quat_angle_axis(0.3, &glm::vec3(1.0, 0.0, 0.0));
        let y = glm::quat_angle_axis(0.2, &glm::vec3(0.0, 1.0, 0.0));
        rig.set_bone_rotation(neck, x);
        rig.set_bone_rotation(neck, y);
        let rotation = rig.skeleton.bones[neck].rotation;
        assert!((rotation.coords - y.coords).norm() < 1e-6);

        rig.reset_bone(neck);
        let identity: glm::Quat = glm::quat_identity();
        assert!((rig.skeleton.bones[neck].rotation.coords - identity.coords).norm() < 1e-6);
    }
}
