//! Motion parameters - serializable authoring data for creature archetypes
//!
//! All tunables live here, grouped by strategy. Presets serialize to RON so
//! designers can author archetypes as data. The mass clamp is applied at
//! controller init (the minimum depends on the locomotion variant), not at
//! parse time.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Reference "vertical" used to resolve the initial up-vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpAxis {
    #[default]
    Up,
    Down,
    Right,
    Left,
    Forward,
    Back,
}

impl UpAxis {
    pub fn as_vec3(self) -> glam::Vec3 {
        use glam::Vec3;
        match self {
            UpAxis::Up => Vec3::Y,
            UpAxis::Down => Vec3::NEG_Y,
            UpAxis::Right => Vec3::X,
            UpAxis::Left => Vec3::NEG_X,
            UpAxis::Forward => Vec3::Z,
            UpAxis::Back => Vec3::NEG_Z,
        }
    }
}

/// Core motion tunables shared by every locomotion variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Mass in abstract units; clamped to the strategy minimum at init.
    pub mass: f32,
    pub up_axis: UpAxis,
    /// Orientation blend speed in degrees per second.
    pub orientation_speed: f32,
    /// Drive orientation through body angular velocity instead of the
    /// controller's own rotate-towards blending.
    pub use_angular_velocity: bool,
    /// Frontal area in square units, part of the terminal velocity drag term.
    pub frontal_area: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            up_axis: UpAxis::Up,
            orientation_speed: 120.0,
            use_angular_velocity: false,
            frontal_area: 1.0,
        }
    }
}

impl MotionParams {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.orientation_speed.is_finite() || self.orientation_speed < 0.0 {
            return Err(MotionError::InvalidParam {
                name: "orientation_speed",
                value: self.orientation_speed,
            });
        }
        if !self.mass.is_finite() {
            return Err(MotionError::InvalidParam {
                name: "mass",
                value: self.mass,
            });
        }
        if !self.frontal_area.is_finite() || self.frontal_area <= 0.0 {
            return Err(MotionError::InvalidParam {
                name: "frontal_area",
                value: self.frontal_area,
            });
        }
        Ok(())
    }
}

/// Ground walker tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundParams {
    /// Face the velocity vector instead of the pilot direction.
    pub face_direction: bool,
    /// Snap yaw to the two facing angles instead of rotating freely.
    pub limit_horizontal_rotation: bool,
    pub face_left_angle: f32,
    pub face_right_angle: f32,
}

impl Default for GroundParams {
    fn default() -> Self {
        Self {
            face_direction: false,
            limit_horizontal_rotation: false,
            face_left_angle: -90.0,
            face_right_angle: 90.0,
        }
    }
}

/// Flyer tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AirParams {
    /// Maximum banking roll in degrees; zero disables banking.
    pub max_bank_angle: f32,
    /// Full 3-axis orientation derived from the heading angle.
    pub dragon_style: bool,
    /// Clamp how far up/down a dragon-style flyer may pitch.
    pub cap_vertical_rotation: bool,
    pub cap_up_angle: f32,
    pub cap_down_angle: f32,
    pub limit_horizontal_rotation: bool,
    pub face_left_angle: f32,
    pub face_right_angle: f32,
}

impl Default for AirParams {
    fn default() -> Self {
        Self {
            max_bank_angle: 0.0,
            dragon_style: false,
            cap_vertical_rotation: false,
            cap_up_angle: 40.0,
            cap_down_angle: 40.0,
            limit_horizontal_rotation: false,
            face_left_angle: -90.0,
            face_right_angle: 90.0,
        }
    }
}

/// Wall/ceiling walker tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WallWalkingParams {
    pub limit_horizontal_rotation: bool,
    pub face_left_angle: f32,
    pub face_right_angle: f32,
}

impl Default for WallWalkingParams {
    fn default() -> Self {
        Self {
            limit_horizontal_rotation: false,
            face_left_angle: -90.0,
            face_right_angle: 90.0,
        }
    }
}

/// Rail wagon tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WagonParams {
    /// How fast the momentum scalar grows while descending, per unit slope
    /// per second.
    pub descent_gain: f32,
    /// How fast the momentum scalar decays while climbing.
    pub climb_decay: f32,
}

impl Default for WagonParams {
    fn default() -> Self {
        Self {
            descent_gain: 2.0,
            climb_decay: 1.0,
        }
    }
}

/// Swimmer tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParams {
    /// Seconds a surfacing dive arc lasts before the fall signal may clear.
    pub dive_time: f32,
}

impl Default for WaterParams {
    fn default() -> Self {
        Self { dive_time: 1.0 }
    }
}

/// Complete authored preset for one creature archetype.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPreset {
    pub motion: MotionParams,
    pub ground: GroundParams,
    pub air: AirParams,
    pub wall_walking: WallWalkingParams,
    pub wagon: WagonParams,
    pub water: WaterParams,
}

impl MotionPreset {
    /// Parse a preset from RON text.
    pub fn from_ron(text: &str) -> Result<Self, MotionError> {
        let preset: MotionPreset =
            ron::from_str(text).map_err(|e| MotionError::PresetParse(e.to_string()))?;
        preset.motion.validate()?;
        Ok(preset)
    }

    /// Serialize to RON text for authoring round-trips.
    pub fn to_ron(&self) -> Result<String, MotionError> {
        ron::to_string(self).map_err(|e| MotionError::PresetParse(e.to_string()))
    }
}
