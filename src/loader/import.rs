//! glTF import into `LoadedModel`.
//!
//! Extracts triangle primitives, morph target deltas for the mesh with the
//! most targets, the node hierarchy and skins.

use nalgebra_glm as glm;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ViewerError;
use crate::model::{LoadedModel, MeshData, Node, Primitive, Rig, Skeleton, Skin};

/// Import a self-contained asset (`.glb`, or `.gltf` with embedded buffers).
pub fn import_slice(name: &str, bytes: &[u8]) -> Result<LoadedModel, ViewerError> {
    let (document, buffers, _images) = gltf::import_slice(bytes)
        .map_err(|e| ViewerError::new("gltf-import").with_arg("model", name).push_std(e))?;
    Ok(build_model(name, &document, &buffers))
}

/// Import from disk so relative buffer URIs resolve next to the file.
pub fn import_path(name: &str, path: &Path) -> Result<LoadedModel, ViewerError> {
    let (document, buffers, _images) = gltf::import(path).map_err(|e| {
        ViewerError::new("gltf-import")
            .with_arg("model", name)
            .with_arg("path", path.display())
            .push_std(e)
    })?;
    Ok(build_model(name, &document, &buffers))
}

fn build_model(name: &str, document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> LoadedModel {
    let nodes = read_nodes(document);
    let skins = read_skins(document, buffers);

    // mesh index -> (node, skin) of the first node that instances it
    let mut mesh_owner: HashMap<usize, (usize, Option<usize>)> = HashMap::new();
    for node in document.nodes() {
        if let Some(mesh) = node.mesh() {
            mesh_owner
                .entry(mesh.index())
                .or_insert((node.index(), node.skin().map(|s| s.index())));
        }
    }

    // The influence array belongs to the mesh with the most morph targets
    let morph_mesh = document
        .meshes()
        .filter_map(|m| {
            let count = m
                .primitives()
                .next()
                .map(|p| p.morph_targets().count())
                .unwrap_or(0);
            (count > 0).then_some((m.index(), count))
        })
        .max_by_key(|&(_, count)| count);

    let mut primitives = Vec::new();
    let mut morph_target_names = Vec::new();

    for mesh in document.meshes() {
        let Some(&(node, skin)) = mesh_owner.get(&mesh.index()) else {
            log::debug!("{name}: mesh {} is not instanced, skipping", mesh.index());
            continue;
        };
        let owns_morphs = morph_mesh.map(|(idx, _)| idx) == Some(mesh.index());
        if owns_morphs {
            morph_target_names = read_target_names(&mesh);
        }

        for prim in mesh.primitives() {
            if prim.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("{name}: skipping non-triangle primitive in mesh {}", mesh.index());
                continue;
            }
            let mut primitive = read_primitive(&prim, buffers, owns_morphs);
            primitive.node = node;
            primitive.skin = skin;
            primitives.push(primitive);
        }
    }

    let morph_target_count = morph_mesh.map(|(_, count)| count).unwrap_or(0);
    if morph_target_names.len() != morph_target_count {
        morph_target_names.clear();
    }

    let skeleton = Skeleton::from_nodes(&nodes);
    let mesh = MeshData {
        primitives,
        nodes,
        skins,
        morph_target_names,
    };

    log::info!(
        "{name}: {} primitives, {} vertices, {} morph targets, {} bones",
        mesh.primitives.len(),
        mesh.vertex_count(),
        morph_target_count,
        skeleton.bones.len()
    );

    LoadedModel {
        name: name.to_string(),
        mesh,
        rig: Rig::new(morph_target_count, skeleton),
    }
}

fn read_nodes(document: &gltf::Document) -> Vec<Node> {
    let mut nodes: Vec<Node> = document
        .nodes()
        .map(|node| {
            let (t, r, s) = node.transform().decomposed();
            Node {
                name: node.name().unwrap_or_default().to_string(),
                parent: None,
                translation: glm::vec3(t[0], t[1], t[2]),
                rotation: glm::quat(r[0], r[1], r[2], r[3]),
                scale: glm::vec3(s[0], s[1], s[2]),
            }
        })
        .collect();

    for node in document.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }

    nodes
}

fn read_skins(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Vec<Skin> {
    document
        .skins()
        .map(|skin| {
            let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
            let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
            let inverse_bind_matrices = reader
                .read_inverse_bind_matrices()
                .map(|iter| iter.map(glm::Mat4::from).collect())
                .unwrap_or_else(|| vec![glm::Mat4::identity(); joints.len()]);
            Skin {
                joints,
                inverse_bind_matrices,
            }
        })
        .collect()
}

fn read_primitive(prim: &gltf::Primitive, buffers: &[gltf::buffer::Data], with_morphs: bool) -> Primitive {
    let reader = prim.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<glm::Vec3> = reader
        .read_positions()
        .map(|iter| iter.map(|p| glm::vec3(p[0], p[1], p[2])).collect())
        .unwrap_or_default();
    let count = positions.len();

    let normals = reader
        .read_normals()
        .map(|iter| iter.map(|n| glm::vec3(n[0], n[1], n[2])).collect())
        .unwrap_or_else(|| vec![glm::vec3(0.0, 1.0, 0.0); count]);

    let indices = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..count as u32).collect());

    let joints = reader
        .read_joints(0)
        .map(|iter| iter.into_u16().collect())
        .unwrap_or_else(|| vec![[0; 4]; count]);

    let weights = reader
        .read_weights(0)
        .map(|iter| iter.into_f32().collect())
        .unwrap_or_else(|| vec![[1.0, 0.0, 0.0, 0.0]; count]);

    let base_color = prim.material().pbr_metallic_roughness().base_color_factor();

    let morph_deltas = if with_morphs {
        reader
            .read_morph_targets()
            .map(|(positions, _normals, _tangents)| match positions {
                Some(iter) => iter.map(|p| glm::vec3(p[0], p[1], p[2])).collect(),
                None => Vec::new(),
            })
            .collect()
    } else {
        Vec::new()
    };

    Primitive {
        positions,
        normals,
        indices,
        joints,
        weights,
        base_color,
        morph_deltas,
        node: 0,
        skin: None,
    }
}

/// Morph target names from the conventional `extras.targetNames` array.
fn read_target_names(mesh: &gltf::Mesh) -> Vec<String> {
    let Some(raw) = mesh.extras().as_ref() else {
        return Vec::new();
    };
    let Ok(extras) = serde_json::from_str::<serde_json::Value>(raw.get()) else {
        return Vec::new();
    };
    extras
        .get("targetNames")
        .and_then(|names| names.as_array())
        .map(|names| {
            names
                .iter()
                .map(|n| n.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::{Path, PathBuf};

    pub const TARGET_NAMES: [&str; 4] = ["aaa", "iii", "uuu", "eee"];

    /// One skinned triangle with a morph target per name in `TARGET_NAMES`;
    /// target `t` lifts every vertex by `t + 1` along Z.
    pub fn figure_bin() -> Vec<u8> {
        let mut floats: Vec<f32> = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        for t in 0..TARGET_NAMES.len() {
            for _ in 0..3 {
                floats.extend([0.0, 0.0, (t + 1) as f32]);
            }
        }
        bytemuck::cast_slice(&floats).to_vec()
    }

    pub fn figure_json(buffer_uri: Option<&str>) -> String {
        let bin_len = figure_bin().len();
        let mut accessors = vec![serde_json::json!({
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        })];
        let mut views = vec![serde_json::json!({ "buffer": 0, "byteOffset": 0, "byteLength": 36 })];
        let mut targets = Vec::new();
        for t in 0..TARGET_NAMES.len() {
            let z = (t + 1) as f32;
            views.push(serde_json::json!({ "buffer": 0, "byteOffset": 36 * (t + 1), "byteLength": 36 }));
            accessors.push(serde_json::json!({
                "bufferView": t + 1, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, z], "max": [0.0, 0.0, z]
            }));
            targets.push(serde_json::json!({ "POSITION": t + 1 }));
        }

        let mut buffer = serde_json::json!({ "byteLength": bin_len });
        if let Some(uri) = buffer_uri {
            buffer["uri"] = uri.into();
        }

        serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "root", "mesh": 0, "skin": 0, "children": [1] },
                { "name": "首", "translation": [0.0, 1.0, 0.0] }
            ],
            "skins": [{ "joints": [0, 1] }],
            "meshes": [{
                "primitives": [{ "attributes": { "POSITION": 0 }, "targets": targets }],
                "extras": { "targetNames": TARGET_NAMES }
            }],
            "buffers": [buffer],
            "bufferViews": views,
            "accessors": accessors
        })
        .to_string()
    }

    pub fn figure_glb() -> Vec<u8> {
        let mut json = figure_json(None).into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let bin = figure_bin();
        let total = 12 + 8 + json.len() + 8 + bin.len();

        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    /// Write `figure.gltf` with its external `figure.bin` into `dir`.
    pub fn write_figure_gltf(dir: &Path) -> PathBuf {
        std::fs::write(dir.join("figure.bin"), figure_bin()).unwrap();
        let path = dir.join("figure.gltf");
        std::fs::write(&path, figure_json(Some("figure.bin"))).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::pose_mesh;

    #[test]
    fn glb_import_sizes_influences_from_morph_targets() {
        let model = import_slice("figure.glb", &figure_glb()).unwrap();
        assert_eq!(model.rig.morph_target_count(), TARGET_NAMES.len());
        assert_eq!(model.rig.morph_target_influences, vec![0.0; TARGET_NAMES.len()]);
        assert_eq!(model.mesh.morph_target_names, TARGET_NAMES);
        assert_eq!(model.mesh.primitives.len(), 1);
        assert_eq!(model.mesh.primitives[0].morph_deltas.len(), TARGET_NAMES.len());
        assert_eq!(model.mesh.vertex_count(), 3);
        assert_eq!(model.mesh.primitives[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn node_names_become_bones() {
        let model = import_slice("figure.glb", &figure_glb()).unwrap();
        assert_eq!(model.rig.skeleton.find("首"), Some(1));
        assert_eq!(model.rig.skeleton.find("左目"), None);
        assert_eq!(model.mesh.nodes[1].parent, Some(0));
    }

    #[test]
    fn skin_joints_and_default_bind_matrices_are_read() {
        let model = import_slice("figure.glb", &figure_glb()).unwrap();
        assert_eq!(model.mesh.skins.len(), 1);
        assert_eq!(model.mesh.skins[0].joints, vec![0, 1]);
        assert_eq!(model.mesh.skins[0].inverse_bind_matrices, vec![glm::Mat4::identity(); 2]);
        assert_eq!(model.mesh.primitives[0].skin, Some(0));
    }

    #[test]
    fn imported_morph_target_moves_posed_vertices() {
        let mut model = import_slice("figure.glb", &figure_glb()).unwrap();
        assert!(model.rig.set_influence(3, 0.5));
        let posed = pose_mesh(&model.mesh, &model.rig);
        for p in &posed[0].positions {
            assert!((p.z - 2.0).abs() < 1e-5, "{p:?}");
        }
    }

    #[test]
    fn gltf_with_external_buffer_imports_from_disk() {
        let dir = std::env::temp_dir().join(format!("morphvis-gltf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = write_figure_gltf(&dir);

        let model = import_path("figure.gltf", &path).unwrap();
        assert_eq!(model.rig.morph_target_count(), TARGET_NAMES.len());
        assert_eq!(model.rig.skeleton.find("首"), Some(1));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn truncated_bytes_fail_with_model_name() {
        let glb = figure_glb();
        let err = import_slice("figure.glb", &glb[..40]).unwrap_err();
        assert_eq!(err.key, "gltf-import");
        assert!(err.to_string().contains("model=figure.glb"));
    }
}
