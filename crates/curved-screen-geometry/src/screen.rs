use curved_screen_config::{GroupPose, ScreenConfig};
use glam::Mat4;
use serde::Serialize;
use tracing::info;

use crate::layout::{layout_screen, LayoutError, SegmentPose};
use crate::uv::BoxFaceUvs;

/// One panel of the screen: where it sits and which part of the texture it shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenSegment {
    pub pose: SegmentPose,
    pub faces: BoxFaceUvs,
}

impl ScreenSegment {
    pub fn index(&self) -> u32 {
        self.pose.index
    }
}

/// All panels of a curved screen, parented under one group transform.
///
/// Segments are ordered left to right. The set is only ever replaced as a
/// whole; there is no per-segment update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvedScreen {
    pub screen_width: f32,
    pub screen_height: f32,
    pub curve_factor: f32,
    pub group: GroupPose,
    pub segments: Vec<ScreenSegment>,
}

impl CurvedScreen {
    /// Lay out and slice every segment for `config`, or fail without output.
    pub fn generate(config: &ScreenConfig) -> Result<Self, LayoutError> {
        let poses = layout_screen(config)?;
        let total = config.segment_count;
        let uvs = (0..total)
            .map(|i| BoxFaceUvs::for_segment(i, total))
            .collect::<Result<Vec<_>, _>>()?;

        let mut screen = Self::from_parts(config.group, poses, uvs)?;
        screen.screen_width = config.screen_width;
        screen.screen_height = config.screen_height;
        screen.curve_factor = config.resolved_curve_factor();

        info!(
            segments = screen.segments.len(),
            width = screen.screen_width,
            height = screen.screen_height,
            curve_factor = screen.curve_factor,
            "Generated curved screen"
        );
        Ok(screen)
    }

    /// Pair poses and UV sets computed elsewhere. Both must cover the same
    /// number of segments, and the visible slices must tile the texture from
    /// u = 1 at the left segment down to u = 0 at the right one.
    ///
    /// Dimensions are recovered from the poses: width from the projected panel
    /// widths, height from the panel scale. `curve_factor` is recovered from
    /// the outermost slope.
    pub fn from_parts(
        group: GroupPose,
        poses: Vec<SegmentPose>,
        uvs: Vec<BoxFaceUvs>,
    ) -> Result<Self, LayoutError> {
        if poses.len() != uvs.len() {
            return Err(LayoutError::CountMismatch {
                poses: poses.len(),
                uvs: uvs.len(),
            });
        }
        if poses.is_empty() {
            return Err(LayoutError::NoSegments);
        }
        if !slices_tile_texture(&uvs) {
            return Err(LayoutError::CountMismatch {
                poses: poses.len(),
                uvs: implied_segment_count(&uvs[0]),
            });
        }

        let screen_width: f32 = poses.iter().map(SegmentPose::nominal_width).sum();
        let screen_height = poses[0].scale.y;
        let outer = poses[poses.len() - 1];
        let curve_factor = if outer.position.x > 0.0 {
            outer.tangent_angle.tan() * screen_width / (2.0 * outer.position.x)
        } else {
            0.0
        };

        let segments = poses
            .into_iter()
            .zip(uvs)
            .map(|(pose, faces)| ScreenSegment { pose, faces })
            .collect();

        Ok(Self {
            screen_width,
            screen_height,
            curve_factor,
            group,
            segments,
        })
    }

    /// Replace the whole segment set. On error the current set is kept.
    pub fn regenerate(&mut self, config: &ScreenConfig) -> Result<(), LayoutError> {
        *self = Self::generate(config)?;
        Ok(())
    }

    pub fn segment(&self, index: u32) -> Option<&ScreenSegment> {
        self.segments.get(index as usize)
    }

    /// World transform of one segment: group transform × segment local transform.
    pub fn segment_world_transform(&self, index: u32) -> Option<Mat4> {
        self.segment(index)
            .map(|s| self.group.transform() * s.pose.local_transform())
    }
}

const TILE_EPSILON: f32 = 1e-6;

/// Visible slices, taken in segment order, cover [0, 1] right to left with no
/// gap or overlap.
fn slices_tile_texture(uvs: &[BoxFaceUvs]) -> bool {
    let (Some(first), Some(last)) = (uvs.first(), uvs.last()) else {
        return false;
    };
    (first.visible().u_end() - 1.0).abs() <= TILE_EPSILON
        && last.visible().u_start().abs() <= TILE_EPSILON
        && uvs
            .windows(2)
            .all(|w| (w[0].visible().u_start() - w[1].visible().u_end()).abs() <= TILE_EPSILON)
}

/// Segment count a UV set was sliced for, read off its slice width.
fn implied_segment_count(faces: &BoxFaceUvs) -> usize {
    let visible = faces.visible();
    let width = visible.u_end() - visible.u_start();
    if width > 0.0 {
        (1.0 / width).round() as usize
    } else {
        0
    }
}
