use nalgebra_glm as glm;

/// Rest-pose transform of one scene node.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<usize>,
    pub translation: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            translation: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<glm::Mat4>,
}

/// Triangle list geometry for a single primitive.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub positions: Vec<glm::Vec3>,
    pub normals: Vec<glm::Vec3>,
    pub indices: Vec<u32>,
    pub joints: Vec<[u16; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub base_color: [f32; 4],
    /// `morph_deltas[target][vertex]`; empty unless this primitive belongs to
    /// the mesh that owns the influence array.
    pub morph_deltas: Vec<Vec<glm::Vec3>>,
    /// Node that instances this primitive's mesh.
    pub node: usize,
    pub skin: Option<usize>,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            joints: Vec::new(),
            weights: Vec::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            morph_deltas: Vec::new(),
            node: 0,
            skin: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub primitives: Vec<Primitive>,
    pub nodes: Vec<Node>,
    pub skins: Vec<Skin>,
    /// Names of the morph targets, when the asset provides them.
    pub morph_target_names: Vec<String>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.positions.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.primitives.iter().map(|p| p.indices.len()).sum()
    }

    /// Indices of every primitive, offset into one shared vertex buffer.
    pub fn merged_indices(&self) -> Vec<u32> {
        let mut merged = Vec::with_capacity(self.index_count());
        let mut offset = 0u32;
        for prim in &self.primitives {
            merged.extend(prim.indices.iter().map(|i| i + offset));
            offset += prim.positions.len() as u32;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_indices_offset_by_previous_vertices() {
        let tri = Primitive {
            positions: vec![glm::vec3(0.0, 0.0, 0.0); 3],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let mesh = MeshData {
            primitives: vec![tri.clone(), tri],
            ..Default::default()
        };
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.merged_indices(), vec![0, 1, 2, 3, 4, 5]);
    }
}
