//! CPU posing: forward kinematics over the skeleton, morph-target blending,
//! and linear blend skinning.

use nalgebra_glm as glm;

use crate::model::mesh::{MeshData, Primitive};
use crate::model::rig::Rig;

/// Posed vertex data for one primitive.
#[derive(Debug, Clone, Default)]
pub struct PosedPrimitive {
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
}

/// World transform of every node, using the rig's current bone rotations.
///
/// A node whose parent chain loops back on itself is treated as a root.
pub fn world_transforms(mesh: &MeshData, rig: &Rig) -> Vec<glm::Mat4> {
    let count = mesh.nodes.len();
    let mut world = vec![glm::Mat4::identity(); count];
    let mut state = vec![Visit::Pending; count];

    for idx in 0..count {
        compute_node(mesh, rig, &mut world, &mut state, idx);
    }

    world
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

fn compute_node(
    mesh: &MeshData,
    rig: &Rig,
    world: &mut [glm::Mat4],
    state: &mut [Visit],
    idx: usize,
) {
    if state[idx] != Visit::Pending {
        return;
    }
    state[idx] = Visit::InProgress;

    let node = &mesh.nodes[idx];
    let rotation = rig
        .skeleton
        .bones
        .get(idx)
        .map(|bone| bone.rotation)
        .unwrap_or(node.rotation);

    let local = glm::translation(&node.translation)
        * glm::quat_to_mat4(&rotation)
        * glm::scaling(&node.scale);

    world[idx] = match node.parent {
        Some(parent) if parent < world.len() => {
            compute_node(mesh, rig, world, state, parent);
            if state[parent] == Visit::Done {
                world[parent] * local
            } else {
                log::warn!("node {idx}: parent chain through {parent} is cyclic");
                local
            }
        }
        _ => local,
    };
    state[idx] = Visit::Done;
}

/// Base positions with every non-negligible morph weight blended in.
pub fn morphed_positions(prim: &Primitive, influences: &[f32]) -> Vec<glm::Vec3> {
    let mut morphed = prim.positions.clone();

    for (target, &weight) in influences.iter().enumerate() {
        if weight.abs() < 1e-4 {
            continue;
        }
        let Some(deltas) = prim.morph_deltas.get(target) else {
            continue;
        };
        if deltas.len() != morphed.len() {
            continue;
        }
        for (v, delta) in morphed.iter_mut().zip(deltas) {
            *v += delta * weight;
        }
    }

    morphed
}

/// Full pose of the mesh: morph first, then skin (or the owning node's
/// transform for unskinned primitives).
pub fn pose_mesh(mesh: &MeshData, rig: &Rig) -> Vec<PosedPrimitive> {
    let world = world_transforms(mesh, rig);

    let joint_matrices: Vec<Vec<glm::Mat4>> = mesh
        .skins
        .iter()
        .map(|skin| {
            skin.joints
                .iter()
                .zip(&skin.inverse_bind_matrices)
                .map(|(&node, ibm)| {
                    world
                        .get(node)
                        .map(|w| w * ibm)
                        .unwrap_or_else(glm::Mat4::identity)
                })
                .collect()
        })
        .collect();

    mesh.primitives
        .iter()
        .map(|prim| {
            let positions = morphed_positions(prim, &rig.morph_target_influences);
            match prim.skin.and_then(|s| joint_matrices.get(s)) {
                Some(joints) => skin_primitive(prim, &positions, joints),
                None => {
                    let transform = world
                        .get(prim.node)
                        .copied()
                        .unwrap_or_else(glm::Mat4::identity);
                    transform_primitive(prim, &positions, &transform)
                }
            }
        })
        .collect()
}

fn transform_primitive(
    prim: &Primitive,
    positions: &[glm::Vec3],
    transform: &glm::Mat4,
) -> PosedPrimitive {
    let normal_matrix = glm::mat4_to_mat3(transform);
    PosedPrimitive {
        positions: positions
            .iter()
            .map(|p| glm::vec4_to_vec3(&(transform * glm::vec4(p.x, p.y, p.z, 1.0))))
            .collect(),
        normals: prim
            .normals
            .iter()
            .map(|n| safe_normalize(normal_matrix * n))
            .collect(),
    }
}

fn skin_primitive(prim: &Primitive, positions: &[glm::Vec3], joints: &[glm::Mat4]) -> PosedPrimitive {
    let mut posed = PosedPrimitive {
        positions: Vec::with_capacity(positions.len()),
        normals: Vec::with_capacity(positions.len()),
    };

    for (v_idx, pos) in positions.iter().enumerate() {
        let j = prim.joints.get(v_idx).copied().unwrap_or([0; 4]);
        let w = prim.weights.get(v_idx).copied().unwrap_or([1.0, 0.0, 0.0, 0.0]);
        let normal = prim
            .normals
            .get(v_idx)
            .copied()
            .unwrap_or_else(|| glm::vec3(0.0, 1.0, 0.0));
        let p = glm::vec4(pos.x, pos.y, pos.z, 1.0);

        let mut skinned = glm::vec4(0.0, 0.0, 0.0, 0.0);
        let mut skinned_normal = glm::vec3(0.0, 0.0, 0.0);
        for k in 0..4 {
            if w[k] < 1e-4 {
                continue;
            }
            let Some(jm) = joints.get(j[k] as usize) else {
                continue;
            };
            skinned += (jm * p) * w[k];
            skinned_normal += (glm::mat4_to_mat3(jm) * normal) * w[k];
        }

        posed.positions.push(glm::vec4_to_vec3(&skinned));
        posed.normals.push(safe_normalize(skinned_normal));
    }

    posed
}

fn safe_normalize(v: glm::Vec3) -> glm::Vec3 {
    let len = glm::length(&v);
    if len > 1e-8 { v / len } else { glm::vec3(0.0, 1.0, 0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mesh::{Node, Skin};
    use crate::model::rig::Skeleton;

    fn close(a: glm::Vec3, b: glm::Vec3) -> bool {
        (a - b).norm() < 1e-5
    }

    fn single_vertex_mesh() -> MeshData {
        let nodes = vec![
            Node {
                name: "root".to_string(),
                ..Default::default()
            },
            Node {
                name: "首".to_string(),
                parent: Some(0),
                translation: glm::vec3(0.0, 1.0, 0.0),
                ..Default::default()
            },
        ];
        let prim = Primitive {
            positions: vec![glm::vec3(0.0, 2.0, 0.0)],
            normals: vec![glm::vec3(0.0, 0.0, 1.0)],
            indices: vec![0, 0, 0],
            joints: vec![[1, 0, 0, 0]],
            weights: vec![[1.0, 0.0, 0.0, 0.0]],
            morph_deltas: vec![vec![glm::vec3(1.0, 0.0, 0.0)]],
            skin: Some(0),
            ..Default::default()
        };
        MeshData {
            primitives: vec![prim],
            skins: vec![Skin {
                joints: vec![0, 1],
                inverse_bind_matrices: vec![
                    glm::Mat4::identity(),
                    glm::translation(&glm::vec3(0.0, -1.0, 0.0)),
                ],
            }],
            nodes,
            morph_target_names: vec!["a".to_string()],
        }
    }

    #[test]
    fn morph_weights_scale_deltas() {
        let mesh = single_vertex_mesh();
        let morphed = morphed_positions(&mesh.primitives[0], &[0.5]);
        assert!(close(morphed[0], glm::vec3(0.5, 2.0, 0.0)));
    }

    #[test]
    fn rest_pose_leaves_vertices_in_place() {
        let mesh = single_vertex_mesh();
        let rig = Rig::new(1, Skeleton::from_nodes(&mesh.nodes));
        let posed = pose_mesh(&mesh, &rig);
        assert!(close(posed[0].positions[0], glm::vec3(0.0, 2.0, 0.0)));
        assert!(close(posed[0].normals[0], glm::vec3(0.0, 0.0, 1.0)));
    }

    #[test]
    fn bone_rotation_moves_skinned_vertex() {
        let mesh = single_vertex_mesh();
        let mut rig = Rig::new(1, Skeleton::from_nodes(&mesh.nodes));
        let neck = rig.skeleton.find("首").unwrap();
        let quarter = glm::quat_angle_axis(std::f32::consts::FRAC_PI_2, &glm::vec3(0.0, 0.0, 1.0));
        rig.set_bone_rotation(neck, quarter);

        let posed = pose_mesh(&mesh, &rig);
        // (0, 1) above the neck pivot turns to (-1, 0) around Z
        assert!(close(posed[0].positions[0], glm::vec3(-1.0, 1.0, 0.0)));
    }

    #[test]
    fn unskinned_primitive_follows_its_node() {
        let mut mesh = single_vertex_mesh();
        mesh.primitives[0].skin = None;
        mesh.primitives[0].node = 1;
        let rig = Rig::new(1, Skeleton::from_nodes(&mesh.nodes));
        let posed = pose_mesh(&mesh, &rig);
        assert!(close(posed[0].positions[0], glm::vec3(0.0, 3.0, 0.0)));
    }

    #[test]
    fn cyclic_parents_do_not_recurse_forever() {
        let mut mesh = single_vertex_mesh();
        mesh.nodes[0].parent = Some(1);
        mesh.nodes[0].translation = glm::vec3(2.0, 0.0, 0.0);
        let rig = Rig::new(1, Skeleton::from_nodes(&mesh.nodes));

        let world = world_transforms(&mesh, &rig);
        assert_eq!(world.len(), 2);
        // walking up from node 0, node 1 closes the loop and acts as the root
        let origin = glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!(close(glm::vec4_to_vec3(&(world[1] * origin)), glm::vec3(0.0, 1.0, 0.0)));
        assert!(close(glm::vec4_to_vec3(&(world[0] * origin)), glm::vec3(2.0, 1.0, 0.0)));
        assert_eq!(pose_mesh(&mesh, &rig).len(), 1);
    }

    #[test]
    fn self_parented_node_is_a_root() {
        let mut mesh = single_vertex_mesh();
        mesh.nodes[1].parent = Some(1);
        let rig = Rig::new(1, Skeleton::from_nodes(&mesh.nodes));
        let world = world_transforms(&mesh, &rig);
        let origin = glm::vec4(0.0, 0.0, 0.0, 1.0);
        assert!(close(glm::vec4_to_vec3(&(world[1] * origin)), glm::vec3(0.0, 1.0, 0.0)));
    }
}
