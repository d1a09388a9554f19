//! Texture slicing for curved screen segments.
//!
//! The source texture is cut into `total` equal vertical strips and each
//! segment shows one strip on its visible face. Two independent corrections
//! make the strips line up as one image on the panel box (see
//! [`crate::mesh`] for the face convention they are derived against):
//!
//! - strips are handed out in reverse index order, because segment-local +X
//!   runs right-to-left for someone looking at the visible face;
//! - within a strip, `u_end` goes on the local -X corners, so the strip
//!   itself is not mirrored.

use crate::layout::LayoutError;
use curved_screen_config::vec2_serde;
use glam::{Vec2, Vec3};
use serde::Serialize;

/// Horizontal texture interval claimed by one segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvSlice {
    pub u_start: f32,
    pub u_end: f32,
}

/// Texture coordinates for the four corners of one face.
///
/// Corner order is top-left, top-right, bottom-right, bottom-left in the
/// face's local frame, i.e. local (-x,+y), (+x,+y), (+x,-y), (-x,-y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UvQuad {
    #[serde(with = "vec2_serde")]
    pub top_left: Vec2,
    #[serde(with = "vec2_serde")]
    pub top_right: Vec2,
    #[serde(with = "vec2_serde")]
    pub bottom_right: Vec2,
    #[serde(with = "vec2_serde")]
    pub bottom_left: Vec2,
}

impl UvQuad {
    /// Every corner at the origin: the face samples a single texel.
    pub const DEGENERATE: Self = Self {
        top_left: Vec2::ZERO,
        top_right: Vec2::ZERO,
        bottom_right: Vec2::ZERO,
        bottom_left: Vec2::ZERO,
    };

    /// Quad for a slice, with `u_start`/`u_end` swapped against the naive
    /// left-to-right assignment.
    pub fn from_slice(slice: UvSlice) -> Self {
        Self {
            top_left: Vec2::new(slice.u_end, 1.0),
            top_right: Vec2::new(slice.u_start, 1.0),
            bottom_right: Vec2::new(slice.u_start, 0.0),
            bottom_left: Vec2::new(slice.u_end, 0.0),
        }
    }

    pub fn corners(&self) -> [Vec2; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    pub fn u_start(&self) -> f32 {
        self.top_right.x.min(self.top_left.x)
    }

    pub fn u_end(&self) -> f32 {
        self.top_right.x.max(self.top_left.x)
    }

    pub fn is_degenerate(&self) -> bool {
        *self == Self::DEGENERATE
    }
}

/// The strip of texture shown by segment `index` of `total`.
pub fn texture_slice(index: u32, total: u32) -> Result<UvSlice, LayoutError> {
    if total == 0 {
        return Err(LayoutError::NoSegments);
    }
    if index >= total {
        return Err(LayoutError::SegmentOutOfRange { index, total });
    }

    let reversed = total - 1 - index;
    let total = total as f32;
    Ok(UvSlice {
        u_start: reversed as f32 / total,
        u_end: (reversed + 1) as f32 / total,
    })
}

/// Texture coordinates for the visible face of segment `index` of `total`.
pub fn compute_segment_uv(index: u32, total: u32) -> Result<UvQuad, LayoutError> {
    texture_slice(index, total).map(UvQuad::from_slice)
}

/// Faces of the box primitive each segment is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BoxFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl BoxFace {
    /// The only face that samples the texture.
    pub const VISIBLE: BoxFace = BoxFace::NegZ;

    pub fn all() -> &'static [BoxFace; 6] {
        &[
            BoxFace::PosX,
            BoxFace::NegX,
            BoxFace::PosY,
            BoxFace::NegY,
            BoxFace::PosZ,
            BoxFace::NegZ,
        ]
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        match self {
            BoxFace::PosX => Vec3::X,
            BoxFace::NegX => Vec3::NEG_X,
            BoxFace::PosY => Vec3::Y,
            BoxFace::NegY => Vec3::NEG_Y,
            BoxFace::PosZ => Vec3::Z,
            BoxFace::NegZ => Vec3::NEG_Z,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// UV quads for all six faces of one segment's box, in [`BoxFace::all`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxFaceUvs {
    pub faces: [UvQuad; 6],
}

impl BoxFaceUvs {
    /// The visible face gets `quad`, every other face is degenerate.
    pub fn with_visible(quad: UvQuad) -> Self {
        let mut faces = [UvQuad::DEGENERATE; 6];
        faces[BoxFace::VISIBLE.slot()] = quad;
        Self { faces }
    }

    pub fn for_segment(index: u32, total: u32) -> Result<Self, LayoutError> {
        compute_segment_uv(index, total).map(Self::with_visible)
    }

    pub fn face(&self, face: BoxFace) -> &UvQuad {
        &self.faces[face.slot()]
    }

    pub fn visible(&self) -> &UvQuad {
        self.face(BoxFace::VISIBLE)
    }
}
