use crate::model::{MeshData, PosedPrimitive};
use crate::scene::Scene;
use crate::settings::OutlineSettings;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Flatten posed primitives into one vertex list, in primitive order so
/// `MeshData::merged_indices` addresses it.
pub fn build_vertices(mesh: &MeshData, posed: &[PosedPrimitive]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    for (prim, posed) in mesh.primitives.iter().zip(posed) {
        for (i, position) in posed.positions.iter().enumerate() {
            let normal = posed
                .normals
                .get(i)
                .map(|n| [n.x, n.y, n.z])
                .unwrap_or([0.0, 0.0, 1.0]);
            vertices.push(Vertex {
                position: [position.x, position.y, position.z],
                normal,
                color: prim.base_color,
            });
        }
    }
    vertices
}

/// Per-frame uniform block shared by the shaded and outline pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub ambient: [f32; 4],
    pub light_color: [f32; 4],
    /// xyz: normalized direction towards the light.
    pub light_dir: [f32; 4],
    /// rgb: outline colour, w: thickness in world units.
    pub outline: [f32; 4],
}

impl Globals {
    pub fn new(scene: &Scene, outline: &OutlineSettings) -> Self {
        let d = scene.light.direction;
        let [r, g, b] = outline.color;
        Self {
            view_proj: scene.view_proj().into(),
            ambient: [scene.ambient.x, scene.ambient.y, scene.ambient.z, 1.0],
            light_color: [scene.light.color.x, scene.light.color.y, scene.light.color.z, 1.0],
            light_dir: [d.x, d.y, d.z, 0.0],
            outline: [r, g, b, outline.thickness.max(0.0)],
        }
    }
}
