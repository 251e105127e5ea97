//! Underwater locomotion - swimming and the surfacing dive arc
//!
//! Swimming itself is plain impulse steering. The interesting part is
//! leaving the water: surfacing launches a free-fall dive arc and a timer;
//! only once the timer has run out while the swimmer is back under water
//! does the fall signal clear. A quick splash above the surface therefore
//! stays one continuous arc instead of snapping back to swim.

use glam::Vec3;

use crate::config::WaterParams;
use crate::controller::{MotionCore, TickEnv, HEIGHT_SENTINEL};
use crate::math::{self, DEPTH_BIAS};
use crate::signals::SignalMask;
use crate::strategy::{steer_towards, Locomotion};

/// Swimmer driven by pilot impulse, with a dive arc on surfacing.
#[derive(Debug)]
pub struct Water {
    params: WaterParams,
    dive_timer: f32,
}

impl Water {
    pub fn new(params: WaterParams) -> Self {
        Self {
            params,
            dive_timer: 0.0,
        }
    }
}

impl Locomotion for Water {
    fn on_init(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.direction = env.pilot.direction;
        self.dive_timer = 0.0;
        env.view.height(HEIGHT_SENTINEL);
    }

    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.direction = env.pilot.direction;

        if !env.signals.get(SignalMask::IN_WATER) {
            log::debug!("surfaced, starting dive arc");
            self.dive_timer = self.params.dive_time;
            core.start_free_fall(env);
        }
    }

    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        core.velocity = steer_towards(core.velocity, env.pilot.impulse, core.mass, env.pilot.speed);
        core.body.velocity = core.velocity + core.external_velocity;
    }

    /// The dive arc ends only when the timer has elapsed and the swimmer is
    /// submerged again.
    fn update_free_fall(&mut self, _core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.dive_timer -= env.dt;
        if self.dive_timer <= 0.0 && env.signals.get(SignalMask::IN_WATER) {
            env.signals.set(SignalMask::FALL_DOWN, false);
        }
    }

    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3) {
        core.direction = (player_position - core.body.position).normalize_or_zero();
    }

    fn update_orientation(&mut self, core: &mut MotionCore) {
        core.target_rotation = math::look_rotation(core.direction + DEPTH_BIAS, core.up);
    }
}
