//! Locomotion strategies - one fixed hook set, five movement models
//!
//! The controller calls into exactly one of these per entity. Strategies
//! never talk to each other and never keep references to the core; every
//! hook receives the core and the tick collaborators explicitly.

use glam::{Quat, Vec3};

use crate::controller::{MotionCore, TickEnv};
use crate::surface::ContactPoint;

pub mod air;
pub mod ground;
pub mod wagon;
pub mod wall_walking;
pub mod water;

pub use air::Air;
pub use ground::Ground;
pub use wagon::Wagon;
pub use wall_walking::WallWalking;
pub use water::Water;

/// Hook set every locomotion variant implements. Hooks with a default body
/// are optional reactions; the rest define the movement model.
pub trait Locomotion {
    /// One-time setup when the entity is bound to its body.
    fn on_attach(&mut self, _core: &mut MotionCore) {}

    /// Reset strategy state when the entity (re)spawns.
    fn on_init(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>);

    /// Per-tick logic while the entity moves freely.
    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>);

    /// Physics-tick integration while the entity moves freely.
    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>);

    /// Reaction to entering free fall (ground halves velocity, others don't
    /// care).
    fn on_free_fall(&mut self, _core: &mut MotionCore) {}

    /// Per-tick logic while free-falling (landing detection, recovery).
    fn update_free_fall(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>);

    /// Turn toward the player-controlled entity (infatuation).
    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3);

    /// Recompute the target rotation from the current direction.
    fn update_orientation(&mut self, core: &mut MotionCore);

    /// Reaction to an externally injected velocity.
    fn on_set_velocity(&mut self, _core: &mut MotionCore) {}

    /// Suspend/resume surface seeking; only wall walkers implement this.
    fn set_collision_checks(&mut self, _core: &mut MotionCore, _enabled: bool) {}

    fn ground_contact_enter(
        &mut self,
        _core: &mut MotionCore,
        _env: &mut TickEnv<'_>,
        _contacts: &[ContactPoint],
    ) {
    }

    fn ground_contact_stay(
        &mut self,
        _core: &mut MotionCore,
        _env: &mut TickEnv<'_>,
        _contacts: &[ContactPoint],
    ) {
    }

    fn ground_contact_exit(&mut self, _core: &mut MotionCore, _env: &mut TickEnv<'_>) {}

    /// Lower bound for the mass clamp applied at init.
    fn min_mass(&self) -> f32 {
        1.0
    }
}

/// Blend the current velocity toward the pilot impulse, weighted by mass,
/// and clamp to the pilot's desired speed. Mass 1 follows the impulse
/// directly; heavier creatures accelerate sluggishly.
pub(crate) fn steer_towards(velocity: Vec3, impulse: Vec3, mass: f32, max_speed: f32) -> Vec3 {
    if (mass - 1.0).abs() < f32::EPSILON {
        impulse
    } else {
        let mass = mass.max(f32::MIN_POSITIVE);
        let step = (impulse - velocity) / mass;
        (velocity + step).clamp_length_max(max_speed)
    }
}

/// Snap a facing rotation to one of two authored yaw angles around `axis`,
/// chosen by the horizontal sign of `direction`. Used by sprite-like
/// creatures that only ever face left or right.
pub(crate) fn clamp_facing(
    target: Quat,
    direction: Vec3,
    axis: Vec3,
    left_angle: f32,
    right_angle: f32,
) -> Quat {
    if direction.x < 0.0 {
        Quat::from_axis_angle(axis, left_angle.to_radians()) * target
    } else if direction.x > 0.0 {
        Quat::from_axis_angle(axis, right_angle.to_radians()) * target
    } else {
        target
    }
}
