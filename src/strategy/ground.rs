//! Ground locomotion - walking, jumping and fall recovery
//!
//! The walker keeps itself glued to whatever the downward probe finds. Loss
//! of support beyond a short grace period, or a jump descent that overshoots
//! the recorded rise, escalates into a real free fall so the fall animation
//! never loops forever on a steep drop.

use glam::Vec3;

use crate::config::GroundParams;
use crate::controller::{MotionCore, TickEnv, GRAVITY, HEIGHT_SENTINEL};
use crate::math::{self, DEPTH_BIAS};
use crate::pilot::ActionMask;
use crate::signals::SignalMask;
use crate::strategy::{clamp_facing, steer_towards, Locomotion};
use crate::surface::ContactPoint;

/// Continuous unsupported time that forces a free fall.
const FREE_FALL_THRESHOLD: f32 = 0.35;

/// Downward probe starts this far above the feet and reaches this far.
const PROBE_RISE: f32 = 3.0;
const PROBE_RANGE: f32 = 6.0;

/// Sensed height below which the walker counts as supported.
const ON_GROUND_HEIGHT: f32 = 0.3;

/// Squared contact-to-feet distance accepted as a ground touch.
const CONTACT_EPSILON_SQ: f32 = 0.3;

/// Descent beyond this multiple of the recorded rise aborts into free fall.
const JUMP_ABORT_RATIO: f32 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SubState {
    Idle,
    Move,
    JumpStart,
    JumpUp,
    JumpDown,
}

/// Ground walker with a nested jump sub-state machine.
#[derive(Debug)]
pub struct Ground {
    params: GroundParams,

    sub: SubState,
    next_sub: SubState,

    ground_normal: Vec3,
    ground_direction: Vec3,
    /// Accumulated gravity while supported; reset on every ground touch.
    gravity: Vec3,
    on_ground: bool,
    height_from_ground: f32,

    jump_start_y: f32,
    jump_up_distance: f32,
    fall_timer: f32,
}

impl Ground {
    pub fn new(params: GroundParams) -> Self {
        Self {
            params,
            sub: SubState::Idle,
            next_sub: SubState::Idle,
            ground_normal: Vec3::Y,
            ground_direction: Vec3::X,
            gravity: Vec3::ZERO,
            on_ground: false,
            height_from_ground: HEIGHT_SENTINEL,
            jump_start_y: 0.0,
            jump_up_distance: 0.0,
            fall_timer: FREE_FALL_THRESHOLD,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn ground_direction(&self) -> Vec3 {
        self.ground_direction
    }

    /// Downward probe along the current up-vector. A miss counts as
    /// unsupported with the sentinel height; it never halts simulation.
    fn sense_ground(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        let origin = core.feet_position() + core.up * PROBE_RISE;

        let mut normal = Vec3::Y;
        let mut height = HEIGHT_SENTINEL;
        if let Some(hit) = env.probe.probe(origin, -core.up, PROBE_RANGE) {
            normal = hit.normal;
            height = hit.distance - PROBE_RISE;
        }

        if height < ON_GROUND_HEIGHT {
            self.gravity = Vec3::ZERO;
        }

        self.on_ground = height < ON_GROUND_HEIGHT;
        self.ground_normal = normal;
        self.ground_direction = Vec3::NEG_Z.cross(normal);
        self.height_from_ground = height;

        env.view.height(height);
    }

    fn refresh_from_contact(&mut self, env: &mut TickEnv<'_>, normal: Vec3) {
        self.ground_normal = normal;
        self.ground_direction = Vec3::NEG_Z.cross(normal);
        self.gravity = Vec3::ZERO;
        self.fall_timer = FREE_FALL_THRESHOLD;
        self.height_from_ground = 0.0;
        env.view.height(0.0);
        self.on_ground = true;
    }

    fn change_sub_state(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        // leave current sub-state
        match self.sub {
            SubState::Move => core.stop(env.view),
            SubState::JumpDown => {
                self.height_from_ground = 0.0;
                env.view.height(0.0);
                self.on_ground = true;
                env.view.jumping(false);
                core.stop(env.view);
            }
            _ => {}
        }

        // enter next sub-state
        match self.next_sub {
            SubState::JumpStart => {
                self.jump_start_y = core.body.position.y;
                self.jump_up_distance = 0.0;

                self.height_from_ground = 0.0;
                env.view.height(0.0);
                self.on_ground = true;
                env.view.jumping(true);
                core.stop(env.view);
            }
            SubState::JumpDown => {
                self.jump_up_distance = core.body.position.y - self.jump_start_y;
                self.jump_start_y = core.body.position.y;
            }
            _ => {}
        }

        self.sub = self.next_sub;
    }
}

impl Locomotion for Ground {
    fn on_init(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.on_ground = false;
        self.sense_ground(core, env);

        // settle onto the surface below the spawn point, if there is one
        let origin = core.feet_position() + core.up * 0.1;
        if let Some(hit) = env.probe.probe(origin, -self.ground_normal, 5.0) {
            core.set_feet_position(hit.point);
            self.height_from_ground = 0.0;
            env.view.height(0.0);
            self.on_ground = true;
        }

        self.gravity = Vec3::ZERO;
        self.fall_timer = FREE_FALL_THRESHOLD;
        self.sub = SubState::Idle;
        self.next_sub = SubState::Idle;
    }

    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.next_sub != self.sub {
            self.change_sub_state(core, env);
        }

        self.sense_ground(core, env);

        if self.params.face_direction {
            core.direction = core.velocity.normalize_or_zero();
        } else {
            core.direction = env.pilot.direction;
            if !env.pilot.is_action_pressed(ActionMask::STOP) {
                // sprite-like walkers only ever face left or right
                core.direction = if core.direction.x >= 0.0 {
                    Vec3::X
                } else {
                    Vec3::NEG_X
                };
            }
        }

        match self.sub {
            SubState::Idle => {
                if env.pilot.is_action_pressed(ActionMask::JUMP) {
                    self.next_sub = SubState::JumpStart;
                } else if env.pilot.speed > 0.01 {
                    self.next_sub = SubState::Move;
                }
            }

            SubState::Move => {
                if env.pilot.is_action_pressed(ActionMask::JUMP) {
                    self.next_sub = SubState::JumpStart;
                } else if env.pilot.speed <= 0.01 {
                    self.next_sub = SubState::Idle;
                }
            }

            SubState::JumpStart => {}

            SubState::JumpUp => {
                if core.velocity.y < 0.0 {
                    self.next_sub = SubState::JumpDown;
                }
            }

            SubState::JumpDown => {
                if self.on_ground {
                    env.pilot.release_action(ActionMask::JUMP);
                    self.next_sub = SubState::Idle;
                } else {
                    let drop = self.jump_start_y - core.body.position.y;
                    if drop > self.jump_up_distance * JUMP_ABORT_RATIO {
                        log::debug!("jump descent exceeded rise, forcing free fall");
                        core.start_free_fall(env);
                    }
                }
            }
        }

        if self.sub <= SubState::Move && !self.on_ground {
            self.fall_timer -= env.dt;
            if self.fall_timer <= 0.0 {
                core.start_free_fall(env);
                self.fall_timer = FREE_FALL_THRESHOLD;
            }
        }
    }

    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        let mut gv = Vec3::NEG_Y * GRAVITY * env.dt;

        if self.sub >= SubState::JumpStart {
            // ballistic phase, plain gravity on the jump velocity
            core.velocity += gv;
            core.body.velocity = core.velocity;
            return;
        }

        // stronger pull when walking down a slope so the walker hugs it
        if self.ground_direction.y < -0.25 && core.direction.x > 0.0
            || self.ground_direction.y > 0.25 && core.direction.x < 0.0
        {
            gv *= 25.0 * self.ground_direction.y.abs();
        }

        self.gravity += gv;

        if self.sub == SubState::Idle {
            core.body.velocity = self.gravity.clamp_length_max(core.terminal_velocity);
        } else {
            core.velocity =
                steer_towards(core.velocity, env.pilot.impulse, core.mass, env.pilot.speed);
            core.body.angular_velocity = Vec3::ZERO;
            core.body.velocity = (core.velocity + core.external_velocity + self.gravity)
                .clamp_length_max(core.terminal_velocity);
        }
    }

    fn on_free_fall(&mut self, core: &mut MotionCore) {
        core.velocity *= 0.5;
    }

    fn update_free_fall(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.sense_ground(core, env);

        if self.params.face_direction {
            core.direction = core.velocity.normalize_or_zero();
            self.update_orientation(core);
        }

        if self.on_ground {
            self.fall_timer = FREE_FALL_THRESHOLD;
            env.pilot.release_action(ActionMask::JUMP);
            env.signals.set(SignalMask::FALL_DOWN, false);
            env.view.height(0.0);
            self.next_sub = SubState::Idle;
        }
    }

    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3) {
        let mut dir = player_position - core.feet_position();
        dir.y = 0.0;
        core.direction = dir.normalize_or_zero();
    }

    fn update_orientation(&mut self, core: &mut MotionCore) {
        core.target_rotation = math::look_rotation(core.direction + DEPTH_BIAS, core.up);

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

    fn on_set_velocity(&mut self, _core: &mut MotionCore) {
        if self.sub == SubState::JumpStart {
            self.next_sub = SubState::JumpUp;
        }
    }

    fn ground_contact_enter(
        &mut self,
        core: &mut MotionCore,
        env: &mut TickEnv<'_>,
        contacts: &[ContactPoint],
    ) {
        self.ground_contact_stay(core, env, contacts);
    }

    fn ground_contact_stay(
        &mut self,
        core: &mut MotionCore,
        env: &mut TickEnv<'_>,
        contacts: &[ContactPoint],
    ) {
        let feet = core.feet_position();
        for contact in contacts {
            if contact.point.distance_squared(feet) <= CONTACT_EPSILON_SQ {
                self.refresh_from_contact(env, contact.normal);
                break;
            }
        }
    }

    fn ground_contact_exit(&mut self, _core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.on_ground = false;
        self.height_from_ground = HEIGHT_SENTINEL;
        env.view.height(HEIGHT_SENTINEL);
    }
}
