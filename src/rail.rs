//! Rail tracks - polyline splines sampled by cumulative travel distance
//!
//! Wagon-style creatures read their position straight off a track instead of
//! simulating it. Tracks are authored as world-space point lists.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// One sample along a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailSample {
    pub position: Vec3,
    /// Unit travel direction at the sampled distance.
    pub direction: Vec3,
    /// Lateral unit vector, pointing to the track's right side.
    pub right: Vec3,
}

/// Piecewise-linear rail through a list of world points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RailTrack {
    points: Vec<Vec3>,
    /// Cumulative arc length at each point; same length as `points`.
    arc_lengths: Vec<f32>,
}

impl RailTrack {
    pub fn new(points: Vec<Vec3>) -> Result<Self, MotionError> {
        if points.len() < 2 {
            return Err(MotionError::DegenerateRail);
        }
        let mut arc_lengths = Vec::with_capacity(points.len());
        let mut total = 0.0;
        arc_lengths.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            arc_lengths.push(total);
        }
        if total <= f32::EPSILON {
            return Err(MotionError::DegenerateRail);
        }
        Ok(Self {
            points,
            arc_lengths,
        })
    }

    /// Total arc length of the track.
    pub fn length(&self) -> f32 {
        *self.arc_lengths.last().unwrap_or(&0.0)
    }

    /// Sample the track at a travel distance. Distances are clamped to the
    /// track, callers detect completion by comparing against `length()`.
    pub fn sample(&self, distance: f32) -> RailSample {
        let distance = distance.clamp(0.0, self.length());

        // find the segment containing `distance`
        let mut seg = 0;
        while seg + 2 < self.arc_lengths.len() && self.arc_lengths[seg + 1] < distance {
            seg += 1;
        }

        let seg_start = self.arc_lengths[seg];
        let seg_len = self.arc_lengths[seg + 1] - seg_start;
        let t = if seg_len > f32::EPSILON {
            (distance - seg_start) / seg_len
        } else {
            0.0
        };

        let a = self.points[seg];
        let b = self.points[seg + 1];
        let direction = (b - a).normalize_or_zero();
        let mut right = direction.cross(Vec3::Y);
        if right.length_squared() < 1e-8 {
            // vertical segment, lateral defaults to depth axis
            right = Vec3::Z;
        }

        RailSample {
            position: a.lerp(b, t),
            direction,
            right: right.normalize(),
        }
    }
}
