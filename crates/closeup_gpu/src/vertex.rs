use bytemuck::{Pod, Zeroable};

/// Quad corner plus texture coordinate, both in the unit square.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Unit quad; the shader stretches it over each draw's rectangle.
    /// `(0, 0)` is the top-left corner in both position and texture space.
    pub fn unit_quad() -> ([Vertex; 4], [u16; 6]) {
        let vertices = [
            Vertex { position: [0.0, 0.0], tex_coords: [0.0, 0.0] },
            Vertex { position: [1.0, 0.0], tex_coords: [1.0, 0.0] },
            Vertex { position: [1.0, 1.0], tex_coords: [1.0, 1.0] },
            Vertex { position: [0.0, 1.0], tex_coords: [0.0, 1.0] },
        ];
        (vertices, [0, 1, 2, 0, 2, 3])
    }
}
