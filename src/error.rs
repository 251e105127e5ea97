//! Error types for preset loading and track construction

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    /// RON preset failed to parse.
    #[error("failed to parse motion preset: {0}")]
    PresetParse(String),

    /// A preset parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParam { name: &'static str, value: f32 },

    /// A rail track needs at least two distinct points.
    #[error("rail track is degenerate (fewer than two distinct points)")]
    DegenerateRail,
}
