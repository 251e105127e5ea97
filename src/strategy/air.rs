//! Aerial locomotion - steering flight with banking
//!
//! Flyers ignore gravity and ground sensing entirely; the pilot impulse is
//! the only force. Orientation is where the variety lives: plain flyers
//! bank into turns up to an authored roll limit, large flyers derive a full
//! 3-axis pose from the heading angle the way the player dragon does.

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::config::AirParams;
use crate::controller::{MotionCore, TickEnv, HEIGHT_SENTINEL};
use crate::math::{self, DEPTH_BIAS};
use crate::strategy::{clamp_facing, steer_towards, Locomotion};

/// Flyer driven purely by pilot impulse.
#[derive(Debug)]
pub struct Air {
    params: AirParams,
}

impl Air {
    pub fn new(params: AirParams) -> Self {
        Self { params }
    }

    /// Full pose from the heading angle: the mesh is first yawed onto the
    /// travel plane, then the whole frame rolls with the heading, so flying
    /// left naturally turns the creature over.
    fn dragon_orientation(&self, direction: Vec3) -> Quat {
        let mut angle = math::heading_angle(direction);

        if self.params.cap_vertical_rotation {
            let up_cap = self.params.cap_up_angle.to_radians();
            let down_cap = self.params.cap_down_angle.to_radians();
            if angle > FRAC_PI_2 {
                // facing left, pitch measured from negative X
                let pitch = std::f32::consts::PI - angle;
                angle = std::f32::consts::PI - pitch.clamp(-down_cap, up_cap);
            } else if angle < -FRAC_PI_2 {
                let pitch = -std::f32::consts::PI - angle;
                angle = -std::f32::consts::PI - pitch.clamp(-up_cap, down_cap);
            } else {
                angle = angle.clamp(-down_cap, up_cap);
            }
        }

        Quat::from_rotation_z(angle) * Quat::from_rotation_y(FRAC_PI_2)
    }

    /// Roll into the turn proportionally to how far the heading leaves
    /// world-right, clamped to the authored maximum.
    fn banked_orientation(&self, direction: Vec3, up: Vec3) -> Quat {
        let mut target = math::look_rotation(direction + DEPTH_BIAS, up);

        if self.params.max_bank_angle > 0.0 {
            let heading = math::heading_angle(direction).to_degrees();
            let bank = heading.clamp(-self.params.max_bank_angle, self.params.max_bank_angle);
            // roll around the local forward axis
            target *= Quat::from_rotation_z(bank.to_radians());
        }

        target
    }
}

impl Locomotion for Air {
    fn on_init(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.direction = env.pilot.direction;
        env.view.height(HEIGHT_SENTINEL);
    }

    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.direction = env.pilot.direction;
    }

    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.velocity = steer_towards(core.velocity, env.pilot.impulse, core.mass, env.pilot.speed);
        core.body.velocity = core.velocity + core.external_velocity;
    }

    /// Flyers have no landing recovery; whoever raised the fall signal
    /// clears it again.
    fn update_free_fall(&mut self, _core: &mut MotionCore, _env: &mut TickEnv<'_>) {}

    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3) {
        core.direction = (player_position - core.body.position).normalize_or_zero();
    }

    fn update_orientation(&mut self, core: &mut MotionCore) {
        core.target_rotation = if self.params.dragon_style {
            self.dragon_orientation(core.direction)
        } else {
            self.banked_orientation(core.direction, core.up)
        };

        if self.params.limit_horizontal_rotation {
            core.target_rotation = clamp_facing(
                core.target_rotation,
                core.direction,
                core.up,
                self.params.face_left_angle,
                self.params.face_right_angle,
            );
        }
    }
}
