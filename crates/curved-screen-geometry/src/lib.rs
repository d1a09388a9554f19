//! Curved screen geometry.
//!
//! Lays a chain of flat panels along a parabola and slices one texture across
//! them so the panels read as a single continuous image. Everything here is a
//! pure function of its inputs; the host turns the output into renderables.

pub mod layout;
pub mod mesh;
pub mod screen;
pub mod uv;

pub use layout::{
    compute_segment_poses, layout_screen, max_tangent_angle, nominal_segment_width, CurveProfile,
    LayoutError, SegmentPose, SEGMENT_DEPTH, STEEP_TANGENT_ANGLE,
};
pub use mesh::{PanelMesh, PanelVertex};
pub use screen::{CurvedScreen, ScreenSegment};
pub use uv::{compute_segment_uv, texture_slice, BoxFace, BoxFaceUvs, UvQuad, UvSlice};
