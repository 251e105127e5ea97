//! Surface sensing - raycast probes and collision contact data
//!
//! The motion core never talks to a physics engine directly. Hosts implement
//! [`SurfaceProbe`] on top of whatever raycast facility they have; the
//! controller re-issues probes every tick that needs them and never caches a
//! result across ticks.

use glam::Vec3;

/// Result of a successful surface probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World point where the ray met the surface.
    pub point: Vec3,
    /// Surface normal at the hit point (unit length).
    pub normal: Vec3,
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
}

/// Synchronous raycast against the world's ground/obstacle geometry.
pub trait SurfaceProbe {
    /// Cast from `origin` along `direction` (unit length) up to
    /// `max_distance`. Returns `None` when nothing blocks the ray.
    fn probe(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit>;
}

/// One contact point reported by the host's collision callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Probe that never hits anything. Open-sky test double.
#[derive(Debug, Default)]
pub struct NoSurface;

impl SurfaceProbe for NoSurface {
    fn probe(&self, _origin: Vec3, _direction: Vec3, _max_distance: f32) -> Option<SurfaceHit> {
        None
    }
}

/// Infinite horizontal floor at a fixed height. Simple host geometry and
/// the workhorse of the ground/water tests.
#[derive(Debug, Clone, Copy)]
pub struct PlaneProbe {
    /// World-space Y of the floor surface.
    pub floor_y: f32,
}

impl PlaneProbe {
    pub fn new(floor_y: f32) -> Self {
        Self { floor_y }
    }
}

impl SurfaceProbe for PlaneProbe {
    fn probe(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<SurfaceHit> {
        if direction.y.abs() < f32::EPSILON {
            return None;
        }
        let t = (self.floor_y - origin.y) / direction.y;
        if t < 0.0 || t > max_distance {
            return None;
        }
        Some(SurfaceHit {
            point: origin + direction * t,
            normal: Vec3::Y,
            distance: t,
        })
    }
}
