use curved_screen_config::{quat_serde, vec3_serde, ScreenConfig};
use glam::{Mat4, Quat, Vec3};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Thickness of every panel, independent of curvature.
pub const SEGMENT_DEPTH: f32 = 0.1;

/// Tangent angle past which the gap correction at least doubles a panel's
/// width. Layout still runs, but the result stops looking like a screen.
pub const STEEP_TANGENT_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("A screen needs at least one segment")]
    NoSegments,
    #[error("Screen width must be positive (got {0})")]
    InvalidWidth(f32),
    #[error("Screen height must be positive (got {0})")]
    InvalidHeight(f32),
    #[error("Segment index {index} out of range for {total} segments")]
    SegmentOutOfRange { index: u32, total: u32 },
    #[error("Pose and UV sets disagree on segment count ({poses} poses, {uvs} UV sets)")]
    CountMismatch { poses: usize, uvs: usize },
}

/// The parabola all segment centers sit on.
///
/// `z = curve_factor * (x / width)^2 * width`, so the shape depends on the
/// factor alone and not on the absolute width. Linear in `curve_factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveProfile {
    pub screen_width: f32,
    pub curve_factor: f32,
}

impl CurveProfile {
    pub fn new(screen_width: f32, curve_factor: f32) -> Self {
        Self {
            screen_width,
            curve_factor,
        }
    }

    /// Curve depth at horizontal offset `x`. Zero at the center.
    pub fn depth(&self, x: f32) -> f32 {
        let t = x / self.screen_width;
        self.curve_factor * t * t * self.screen_width
    }

    /// dz/dx at `x`.
    pub fn slope(&self, x: f32) -> f32 {
        2.0 * self.curve_factor * x / self.screen_width
    }

    /// Angle of the tangent at `x`, in radians.
    pub fn tangent_angle(&self, x: f32) -> f32 {
        self.slope(x).atan()
    }
}

/// Local transform of one panel relative to the screen group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentPose {
    /// Position in the left-to-right ordering.
    pub index: u32,
    /// Center offset: x along the width, y always 0, z curve depth.
    #[serde(with = "vec3_serde")]
    pub position: Vec3,
    /// Yaw only, turning the panel's local X onto the curve tangent.
    #[serde(with = "quat_serde")]
    pub rotation: Quat,
    /// (gap-corrected width, screen height, [`SEGMENT_DEPTH`]).
    #[serde(with = "vec3_serde")]
    pub scale: Vec3,
    /// Tangent angle at the center, radians. Yaw is the negation of this.
    pub tangent_angle: f32,
}

impl SegmentPose {
    /// Transform from a unit panel to its place under the group.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Width of the panel projected back onto the X axis.
    pub fn nominal_width(&self) -> f32 {
        self.scale.x * self.tangent_angle.cos()
    }

    /// Centers of the panel's two vertical edges, left then right, in group space.
    pub fn edge_centers(&self) -> (Vec3, Vec3) {
        let half = self.rotation * Vec3::new(self.scale.x / 2.0, 0.0, 0.0);
        (self.position - half, self.position + half)
    }
}

/// Steepest tangent angle among the segment centers of a layout.
///
/// The outermost centers sit half a panel in from the edges, at
/// `x = ±(width / 2)(1 - 1/n)`, where the slope is `curve_factor * (1 - 1/n)`.
pub fn max_tangent_angle(curve_factor: f32, segment_count: u32) -> f32 {
    if segment_count == 0 {
        return 0.0;
    }
    let reach = 1.0 - 1.0 / segment_count as f32;
    (curve_factor.abs() * reach).atan()
}

/// Width of one panel before the gap correction: an equal share of the screen.
pub fn nominal_segment_width(screen_width: f32, segment_count: u32) -> f32 {
    screen_width / segment_count as f32
}

fn validate(segment_count: u32, screen_width: f32, screen_height: f32) -> Result<(), LayoutError> {
    if segment_count == 0 {
        return Err(LayoutError::NoSegments);
    }
    // Negated comparisons so NaN is rejected too.
    if !(screen_width > 0.0) {
        return Err(LayoutError::InvalidWidth(screen_width));
    }
    if !(screen_height > 0.0) {
        return Err(LayoutError::InvalidHeight(screen_height));
    }
    Ok(())
}

/// Lay out `segment_count` flat panels along a parabola, left to right.
///
/// Each panel's center sits on the curve, its face is turned to the local
/// tangent, and its width is stretched by `1 / cos(angle)` so that neighbouring
/// panels still meet once rotated. The stretch is a first-order fix that
/// degrades as the tangent approaches ±90 degrees; `curve_factor` is not
/// clamped, see [`STEEP_TANGENT_ANGLE`].
pub fn compute_segment_poses(
    segment_count: u32,
    screen_width: f32,
    screen_height: f32,
    curve_factor: f32,
) -> Result<Vec<SegmentPose>, LayoutError> {
    validate(segment_count, screen_width, screen_height)?;

    let steepest = max_tangent_angle(curve_factor, segment_count);
    if steepest > STEEP_TANGENT_ANGLE {
        warn!(
            curve_factor,
            steepest_deg = steepest.to_degrees(),
            "Curvature is steep; outer segments will be heavily widened"
        );
    }

    let profile = CurveProfile::new(screen_width, curve_factor);
    let segment_width = nominal_segment_width(screen_width, segment_count);
    let half_width = screen_width / 2.0;

    let poses: Vec<SegmentPose> = (0..segment_count)
        .map(|i| {
            let x = -half_width + (i as f32 + 0.5) * segment_width;
            let z = profile.depth(x);
            let angle = profile.tangent_angle(x);

            SegmentPose {
                index: i,
                position: Vec3::new(x, 0.0, z),
                rotation: Quat::from_rotation_y(-angle),
                scale: Vec3::new(segment_width / angle.cos(), screen_height, SEGMENT_DEPTH),
                tangent_angle: angle,
            }
        })
        .collect();

    debug!(
        segment_count,
        screen_width,
        screen_height,
        curve_factor,
        "Computed segment poses"
    );

    Ok(poses)
}

/// Lay out a screen from its config, filling in the default curve factor.
pub fn layout_screen(config: &ScreenConfig) -> Result<Vec<SegmentPose>, LayoutError> {
    compute_segment_poses(
        config.segment_count,
        config.screen_width,
        config.screen_height,
        config.resolved_curve_factor(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cinema() -> Vec<SegmentPose> {
        compute_segment_poses(22, 16.0, 9.0, 0.3).unwrap()
    }

    #[test]
    fn produces_one_pose_per_segment() {
        let poses = cinema();
        assert_eq!(poses.len(), 22);
        for (i, pose) in poses.iter().enumerate() {
            assert_eq!(pose.index, i as u32);
            assert_eq!(pose.position.y, 0.0);
            assert!((pose.scale.y - 9.0).abs() < 1e-6);
            assert!((pose.scale.z - SEGMENT_DEPTH).abs() < 1e-6);
        }
    }

    #[test]
    fn cinema_reference_values() {
        let poses = cinema();

        // x = -8 + 0.5 * 16 / 22
        let first = poses[0];
        assert!((first.position.x - (-7.636_364)).abs() < 1e-4);
        let expected_z = 0.3 * (first.position.x / 16.0).powi(2) * 16.0;
        assert!((first.position.z - expected_z).abs() < 1e-5);
        assert!((first.position.z - 1.093_4).abs() < 1e-3);

        let right_of_center = poses[11];
        assert!((right_of_center.position.x - 0.363_636).abs() < 1e-4);
        assert!((right_of_center.position.z - 0.002_479).abs() < 1e-5);
    }

    #[test]
    fn outer_edges_reach_half_width() {
        let poses = cinema();
        let step = 16.0 / 22.0;
        assert!((poses[0].position.x - step / 2.0 - (-8.0)).abs() < 1e-5);
        assert!((poses[21].position.x + step / 2.0 - 8.0).abs() < 1e-5);
    }

    #[test]
    fn even_count_is_symmetric_about_center() {
        let poses = cinema();
        let n = poses.len();
        for i in 0..n / 2 {
            let left = poses[i];
            let right = poses[n - 1 - i];
            assert!((left.position.x + right.position.x).abs() < 1e-5);
            assert!((left.position.z - right.position.z).abs() < 1e-5);
            assert!((left.tangent_angle + right.tangent_angle).abs() < 1e-6);
            assert!((left.scale.x - right.scale.x).abs() < 1e-5);
        }
    }

    #[test]
    fn odd_count_center_is_flat() {
        let poses = compute_segment_poses(21, 10.0, 4.0, 0.8).unwrap();
        let middle = poses[10];
        assert!(middle.position.x.abs() < 1e-5);
        assert!(middle.position.z.abs() < 1e-6);
        assert!(middle.tangent_angle.abs() < 1e-6);
        assert!(middle.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn even_count_center_pair_is_nearly_flat() {
        let poses = cinema();
        for pose in &poses[10..12] {
            assert!(pose.position.z.abs() < 0.01);
            assert!(pose.tangent_angle.abs() < 0.03);
        }
    }

    #[test]
    fn x_increases_and_z_dips_at_center() {
        let poses = cinema();
        for pair in poses.windows(2) {
            assert!(pair[1].position.x > pair[0].position.x);
        }
        for i in 0..10 {
            assert!(poses[i + 1].position.z < poses[i].position.z);
        }
        for i in 11..21 {
            assert!(poses[i + 1].position.z > poses[i].position.z);
        }
    }

    #[test]
    fn unadjusted_widths_sum_to_screen_width() {
        for (count, width) in [(1, 12.0), (2, 12.0), (4, 16.0), (8, 16.0), (22, 16.0), (64, 21.0)] {
            let share = nominal_segment_width(width, count);
            let total: f32 = (0..count).map(|_| share).sum();
            assert!((total - width).abs() < 1e-4, "count {count}: {total}");
        }
        // Power-of-two splits are exact.
        assert_eq!(nominal_segment_width(16.0, 8) * 8.0, 16.0);
    }

    #[test]
    fn gap_correction_widens_the_unadjusted_share() {
        let share = nominal_segment_width(16.0, 22);
        for pose in cinema() {
            assert_eq!(pose.scale.x, share / pose.tangent_angle.cos());
            assert!(pose.scale.x >= share);
        }
    }

    #[test]
    fn nominal_widths_sum_to_screen_width() {
        for count in [1, 2, 3, 7, 22, 64] {
            let poses = compute_segment_poses(count, 12.0, 3.0, 0.4).unwrap();
            let total: f32 = poses.iter().map(|p| p.nominal_width()).sum();
            assert!((total - 12.0).abs() < 1e-3, "count {count}: {total}");
        }
    }

    #[test]
    fn panel_x_axis_follows_tangent() {
        let profile = CurveProfile::new(16.0, 0.3);
        for pose in cinema() {
            let axis = pose.rotation * Vec3::X;
            let slope = profile.slope(pose.position.x);
            let tangent = Vec3::new(1.0, 0.0, slope).normalize();
            assert!((axis - tangent).length() < 1e-5);
            // Yaw only.
            assert!(axis.y.abs() < 1e-6);
            assert!(((pose.rotation * Vec3::Y) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn neighbouring_edges_meet() {
        for curve in [0.0, 0.3, 1.0] {
            let poses = compute_segment_poses(22, 16.0, 9.0, curve).unwrap();
            for pair in poses.windows(2) {
                let (_, right_edge) = pair[0].edge_centers();
                let (left_edge, _) = pair[1].edge_centers();
                assert!(
                    (right_edge - left_edge).length() < 1e-4,
                    "curve {curve}: gap between {} and {}",
                    pair[0].index,
                    pair[1].index
                );
            }
        }
    }

    #[test]
    fn doubling_curve_factor_doubles_depth_and_slope() {
        let single = CurveProfile::new(16.0, 0.3);
        let double = CurveProfile::new(16.0, 0.6);
        let a = cinema();
        let b = compute_segment_poses(22, 16.0, 9.0, 0.6).unwrap();
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.position.x, pb.position.x);
            assert!((pb.position.z - 2.0 * pa.position.z).abs() < 1e-5);
            let x = pa.position.x;
            assert!((double.slope(x) - 2.0 * single.slope(x)).abs() < 1e-6);
        }
    }

    #[test]
    fn flat_screen_has_no_depth_or_rotation() {
        for pose in compute_segment_poses(5, 10.0, 2.0, 0.0).unwrap() {
            assert_eq!(pose.position.z, 0.0);
            assert_eq!(pose.tangent_angle, 0.0);
            assert!((pose.scale.x - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn single_segment_spans_whole_screen() {
        let poses = compute_segment_poses(1, 6.0, 2.0, 0.9).unwrap();
        assert_eq!(poses.len(), 1);
        assert_eq!(poses[0].position, Vec3::ZERO);
        assert!((poses[0].scale.x - 6.0).abs() < 1e-6);
    }

    #[test]
    fn zero_segments_is_an_error() {
        assert_eq!(
            compute_segment_poses(0, 16.0, 9.0, 0.3),
            Err(LayoutError::NoSegments)
        );
    }

    #[test]
    fn bad_dimensions_are_errors() {
        assert_eq!(
            compute_segment_poses(4, 0.0, 9.0, 0.3),
            Err(LayoutError::InvalidWidth(0.0))
        );
        assert_eq!(
            compute_segment_poses(4, -2.0, 9.0, 0.3),
            Err(LayoutError::InvalidWidth(-2.0))
        );
        assert!(matches!(
            compute_segment_poses(4, f32::NAN, 9.0, 0.3),
            Err(LayoutError::InvalidWidth(_))
        ));
        assert_eq!(
            compute_segment_poses(4, 16.0, 0.0, 0.3),
            Err(LayoutError::InvalidHeight(0.0))
        );
    }

    #[test]
    fn steep_curvature_is_not_clamped() {
        let poses = compute_segment_poses(22, 16.0, 9.0, 4.0).unwrap();
        let outer = poses[0];
        let expected = CurveProfile::new(16.0, 4.0).tangent_angle(outer.position.x);
        assert!((outer.tangent_angle - expected).abs() < 1e-6);
        assert!(outer.scale.x > 2.0 * 16.0 / 22.0);
        assert!(max_tangent_angle(4.0, 22) > STEEP_TANGENT_ANGLE);
        assert!(max_tangent_angle(0.3, 22) < STEEP_TANGENT_ANGLE);
    }

    #[test]
    fn config_without_curve_factor_uses_default() {
        let mut config = ScreenConfig::new(22, 16.0, 9.0);
        config.curve_factor = None;
        assert_eq!(layout_screen(&config).unwrap(), cinema());
    }
}
