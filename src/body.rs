//! Physics body owned by the motion controller
//!
//! A thin kinematic body: the controller decides velocity and orientation,
//! this struct integrates them. Hosts with a real rigid-body engine can
//! mirror these fields into their body after every physics tick; concurrent
//! writers (knockback, explosions) must go through the controller's
//! `set_velocity`/external velocity, never this struct.

use glam::{Quat, Vec3};

#[derive(Debug, Clone, Copy)]
pub struct RigidBody {
    /// Body origin in world space (not the ground sensor).
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Kinematic bodies ignore velocity integration (latched, on rails).
    pub kinematic: bool,
    /// Collision response toggle, mirrored to the host engine.
    pub detect_collisions: bool,
    /// Host-engine gravity toggle. The controller integrates its own
    /// gravity; this is only raised while the body is handed to the engine
    /// (caged entities resting on the cage floor).
    pub use_gravity: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl RigidBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: false,
            detect_collisions: true,
            use_gravity: false,
        }
    }

    /// Advance position by the current velocity. No-op while kinematic.
    pub fn integrate(&mut self, dt: f32) {
        if self.kinematic {
            return;
        }
        self.position += self.velocity * dt;
    }

    pub fn zero_motion(&mut self) {
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_moves_by_velocity() {
        let mut body = RigidBody::new(Vec3::ZERO);
        body.velocity = Vec3::new(2.0, -1.0, 0.0);
        body.integrate(0.5);
        assert_eq!(body.position, Vec3::new(1.0, -0.5, 0.0));
    }

    #[test]
    fn test_kinematic_body_ignores_velocity() {
        let mut body = RigidBody::new(Vec3::ONE);
        body.velocity = Vec3::X;
        body.kinematic = true;
        body.integrate(1.0);
        assert_eq!(body.position, Vec3::ONE);
    }

    #[test]
    fn test_zero_motion_clears_both_velocities() {
        let mut body = RigidBody::new(Vec3::ZERO);
        body.velocity = Vec3::X;
        body.angular_velocity = Vec3::Y;
        body.zero_motion();
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.angular_velocity, Vec3::ZERO);
    }
}
