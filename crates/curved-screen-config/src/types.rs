use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Number of flat panels used to approximate the curve.
pub const DEFAULT_SEGMENT_COUNT: u32 = 22;
/// Curvature used when a config leaves `curve_factor` unset.
pub const DEFAULT_CURVE_FACTOR: f32 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Preset the screen dimensions were taken from. `Custom` means hand-edited.
    pub preset: ScreenPreset,
    /// Curved screen parameters.
    pub screen: ScreenConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preset: ScreenPreset::Cinema,
            screen: ScreenConfig::from_preset(ScreenPreset::Cinema),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenPreset {
    /// 16:9 screen, 16 units wide, default curvature.
    Cinema,
    /// 21:9 screen, 21 units wide, default curvature.
    Ultrawide,
    /// 16:9 screen with no curvature.
    Flat,
    /// User-defined dimensions.
    Custom,
}

/// Parameters for one generated curved screen.
///
/// Immutable for the lifetime of a generated screen: changing any field means
/// regenerating the whole segment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Number of flat panels. Must be at least 1.
    pub segment_count: u32,
    /// Total width of the assembled surface in world units.
    pub screen_width: f32,
    /// Total height of the assembled surface in world units.
    pub screen_height: f32,
    /// Parabola steepness: 0.0 = flat. `None` resolves to [`DEFAULT_CURVE_FACTOR`].
    ///
    /// Not clamped. Values past ~1.8 push the outer tangents beyond 60
    /// degrees and the outer panels get very wide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_factor: Option<f32>,
    /// Transform applied to the whole screen as a rigid group.
    #[serde(default)]
    pub group: GroupPose,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self::from_preset(ScreenPreset::Cinema)
    }
}

impl ScreenConfig {
    pub fn new(segment_count: u32, screen_width: f32, screen_height: f32) -> Self {
        Self {
            segment_count,
            screen_width,
            screen_height,
            curve_factor: None,
            group: GroupPose::default(),
        }
    }

    /// Screen dimensions for a preset. `Custom` starts from the cinema layout.
    pub fn from_preset(preset: ScreenPreset) -> Self {
        match preset {
            ScreenPreset::Cinema | ScreenPreset::Custom => {
                Self::new(DEFAULT_SEGMENT_COUNT, 16.0, 9.0).with_curve_factor(DEFAULT_CURVE_FACTOR)
            }
            ScreenPreset::Ultrawide => {
                Self::new(DEFAULT_SEGMENT_COUNT, 21.0, 9.0).with_curve_factor(DEFAULT_CURVE_FACTOR)
            }
            ScreenPreset::Flat => Self::new(DEFAULT_SEGMENT_COUNT, 16.0, 9.0).with_curve_factor(0.0),
        }
    }

    pub fn with_curve_factor(mut self, curve_factor: f32) -> Self {
        self.curve_factor = Some(curve_factor);
        self
    }

    pub fn with_group(mut self, group: GroupPose) -> Self {
        self.group = group;
        self
    }

    /// The curve factor to lay out with.
    pub fn resolved_curve_factor(&self) -> f32 {
        self.curve_factor.unwrap_or(DEFAULT_CURVE_FACTOR)
    }
}

/// Rigid transform shared by every segment of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupPose {
    #[serde(with = "crate::vec3_serde")]
    pub position: Vec3,
    #[serde(with = "crate::quat_serde")]
    pub rotation: Quat,
    #[serde(with = "crate::vec3_serde")]
    pub scale: Vec3,
}

impl Default for GroupPose {
    fn default() -> Self {
        // Textured faces point down local -Z; the half turn shows them to a
        // camera at the origin looking down -Z.
        Self {
            position: Vec3::new(0.0, 0.0, -10.0),
            rotation: Quat::from_rotation_y(PI),
            scale: Vec3::ONE,
        }
    }
}

impl GroupPose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Parent transform for all segments.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_curve_factor_resolves_to_default() {
        let config: ScreenConfig = toml::from_str(
            r#"
            segment_count = 12
            screen_width = 8.0
            screen_height = 4.5
            "#,
        )
        .unwrap();

        assert_eq!(config.curve_factor, None);
        assert!((config.resolved_curve_factor() - 0.3).abs() < 1e-6);
        assert_eq!(config.group, GroupPose::default());
    }

    #[test]
    fn explicit_zero_curve_factor_is_kept() {
        let config = ScreenConfig::from_preset(ScreenPreset::Flat);
        assert_eq!(config.resolved_curve_factor(), 0.0);
    }

    #[test]
    fn group_pose_parses_from_arrays() {
        let config: ScreenConfig = toml::from_str(
            r#"
            segment_count = 22
            screen_width = 16.0
            screen_height = 9.0
            curve_factor = 0.5

            [group]
            position = [1.0, 2.0, 3.0]
            rotation = [0.0, 0.0, 0.0, 1.0]
            scale = [2.0, 2.0, 2.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.curve_factor, Some(0.5));
        assert_eq!(config.group.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.group.rotation, Quat::IDENTITY);
        assert_eq!(config.group.scale, Vec3::splat(2.0));
    }

    #[test]
    fn default_app_config_survives_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.preset, ScreenPreset::Cinema);
        assert_eq!(parsed.screen.segment_count, DEFAULT_SEGMENT_COUNT);
        let (_, angle) = parsed.screen.group.rotation.to_axis_angle();
        assert!((angle - PI).abs() < 1e-5);
    }

    #[test]
    fn group_transform_moves_origin_to_position() {
        let group = GroupPose {
            position: Vec3::new(0.0, 1.5, -4.0),
            rotation: Quat::from_rotation_y(0.7),
            scale: Vec3::splat(3.0),
        };
        let origin = group.transform().transform_point3(Vec3::ZERO);
        assert!((origin - group.position).length() < 1e-6);
    }

    #[test]
    fn presets_differ_in_width() {
        let cinema = ScreenConfig::from_preset(ScreenPreset::Cinema);
        let wide = ScreenConfig::from_preset(ScreenPreset::Ultrawide);
        assert_eq!(cinema.screen_height, wide.screen_height);
        assert!(wide.screen_width > cinema.screen_width);
        assert_eq!(ScreenConfig::from_preset(ScreenPreset::Custom), cinema);
    }
}
