//! Box panel meshes for screen segments.
//!
//! Each face lists its four corners counter-clockwise as seen from outside,
//! starting at the face's top-left. For the visible -Z face that is local
//! (-x,+y), (+x,+y), (+x,-y), (-x,-y): seen from the -Z side, local +X is on
//! the viewer's left, which is what the UV slice order is built around.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::screen::CurvedScreen;
use crate::uv::{BoxFace, BoxFaceUvs};

/// Vertex format for panel meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PanelVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl PanelVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 20,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Unit box corners per face, in `BoxFace::all()` order.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // +X
    [
        [0.5, 0.5, -0.5],
        [0.5, 0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, -0.5, -0.5],
    ],
    // -X
    [
        [-0.5, 0.5, 0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, -0.5],
        [-0.5, -0.5, 0.5],
    ],
    // +Y
    [
        [-0.5, 0.5, 0.5],
        [0.5, 0.5, 0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
    ],
    // -Y
    [
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, -0.5, 0.5],
        [-0.5, -0.5, 0.5],
    ],
    // +Z
    [
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
    ],
    // -Z (visible)
    [
        [-0.5, 0.5, -0.5],
        [0.5, 0.5, -0.5],
        [0.5, -0.5, -0.5],
        [-0.5, -0.5, -0.5],
    ],
];

/// A generated panel mesh (vertices + indices).
#[derive(Debug, Clone, Default)]
pub struct PanelMesh {
    pub vertices: Vec<PanelVertex>,
    pub indices: Vec<u32>,
}

impl PanelMesh {
    /// Box of size `scale` centered on the origin, 4 vertices per face.
    pub fn segment_box(scale: Vec3, uvs: &BoxFaceUvs) -> Self {
        let mut mesh = Self {
            vertices: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        mesh.push_box(Mat4::from_scale(scale), uvs);
        mesh
    }

    /// All segments of a screen in one mesh, in group-local space.
    ///
    /// The group transform is left to the caller.
    pub fn from_screen(screen: &CurvedScreen) -> Self {
        let count = screen.segments.len();
        let mut mesh = Self {
            vertices: Vec::with_capacity(count * 24),
            indices: Vec::with_capacity(count * 36),
        };
        for segment in &screen.segments {
            mesh.push_box(segment.pose.local_transform(), &segment.faces);
        }
        mesh
    }

    /// Vertices of one face of the `box_index`th box, `None` past the last box.
    pub fn face_vertices(&self, box_index: usize, face: BoxFace) -> Option<&[PanelVertex]> {
        let start = box_index * 24 + face.slot() * 4;
        self.vertices.get(start..start + 4)
    }

    fn push_box(&mut self, transform: Mat4, uvs: &BoxFaceUvs) {
        for (face_index, &face) in BoxFace::all().iter().enumerate() {
            let base = self.vertices.len() as u32;
            let normal = transform.transform_vector3(face.normal()).normalize_or_zero();
            let corners = uvs.face(face).corners();

            for (corner, uv) in FACE_CORNERS[face_index].iter().zip(corners) {
                let position = transform.transform_point3(Vec3::from_array(*corner));
                self.vertices.push(PanelVertex {
                    position: position.to_array(),
                    uv: uv.to_array(),
                    normal: normal.to_array(),
                });
            }

            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}
