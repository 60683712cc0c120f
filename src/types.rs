use glam::Mat4;

use crate::math::Color;

/// Camera and lighting uniform buffer data for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub ambient: f32,
    pub light_dir: [f32; 3],
    pub _pad: f32,
}

/// Per-vertex data for the unit cube
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance data: model matrix columns then linear RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRaw {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn new(model: Mat4, color: Color) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_rgba(),
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const fn v(position: [f32; 3], normal: [f32; 3]) -> Vertex {
    Vertex { position, normal }
}

/// Unit cube centred on the origin, four vertices per face so each face
/// carries its own normal
pub const CUBE_VERTICES: [Vertex; 24] = [
    // +X
    v([0.5, -0.5, -0.5], [1.0, 0.0, 0.0]),
    v([0.5, 0.5, -0.5], [1.0, 0.0, 0.0]),
    v([0.5, 0.5, 0.5], [1.0, 0.0, 0.0]),
    v([0.5, -0.5, 0.5], [1.0, 0.0, 0.0]),
    // -X
    v([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0]),
    // +Y
    v([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
    v([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0]),
    v([0.5, 0.5, 0.5], [0.0, 1.0, 0.0]),
    v([0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
    // -Y
    v([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([0.5, -0.5, 0.5], [0.0, -1.0, 0.0]),
    // +Z
    v([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    v([0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    v([0.5, 0.5, 0.5], [0.0, 0.0, 1.0]),
    v([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0]),
    // -Z
    v([0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0]),
    v([0.5, 0.5, -0.5], [0.0, 0.0, -1.0]),
];

/// Two counter-clockwise triangles per face
pub const CUBE_INDICES: [u16; 36] = {
    let mut indices = [0u16; 36];
    let mut face = 0;
    while face < 6 {
        let base = (face * 4) as u16;
        let i = face * 6;
        indices[i] = base;
        indices[i + 1] = base + 1;
        indices[i + 2] = base + 2;
        indices[i + 3] = base;
        indices[i + 4] = base + 2;
        indices[i + 5] = base + 3;
        face += 1;
    }
    indices
};
