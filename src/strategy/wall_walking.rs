//! Wall walking - "ground" is whichever surface is nearest
//!
//! The up-vector is not world-up; it is elected by probing the four
//! axis-aligned directions and adopting the normal of the nearest hit.
//! Gravity then pulls along minus that normal, so the same walker code
//! works on floors, walls and ceilings. Choreographed sequences can freeze
//! the election with [`WallWalking`]'s collision-check toggle.

use glam::Vec3;
use smallvec::SmallVec;

use crate::config::WallWalkingParams;
use crate::controller::{MotionCore, TickEnv, GRAVITY, HEIGHT_SENTINEL};
use crate::math::{self, DEPTH_BIAS};
use crate::signals::SignalMask;
use crate::strategy::{clamp_facing, steer_towards, Locomotion};
use crate::surface::{ContactPoint, SurfaceHit};

/// Election probes reach this far in each axis direction.
const FIND_RANGE: f32 = 10.0;

/// Per-tick tracking probe: starts two units along the up-vector, reaches
/// six, and the reported height is offset so that hugging the surface
/// reads as zero.
const PROBE_RISE: f32 = 2.0;
const PROBE_RANGE: f32 = 6.0;
const HEIGHT_OFFSET: f32 = 3.0;

const ON_GROUND_HEIGHT: f32 = 0.3;

/// Look-ahead applied to the tracking probe while moving, smooths the
/// normal across outside corners.
const FORWARD_BIAS: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubState {
    Idle,
    Move,
}

/// Walker that treats the nearest surface in any axis direction as its
/// floor.
#[derive(Debug)]
pub struct WallWalking {
    params: WallWalkingParams,

    sub: SubState,
    next_sub: SubState,

    ground_normal: Vec3,
    ground_direction: Vec3,
    gravity: Vec3,
    on_ground: bool,
    height_from_ground: f32,

    check_collisions: bool,
    saved_up: Vec3,
    saved_normal: Vec3,
    saved_direction: Vec3,
}

impl WallWalking {
    pub fn new(params: WallWalkingParams) -> Self {
        Self {
            params,
            sub: SubState::Idle,
            next_sub: SubState::Idle,
            ground_normal: Vec3::Y,
            ground_direction: Vec3::X,
            gravity: Vec3::ZERO,
            on_ground: false,
            height_from_ground: HEIGHT_SENTINEL,
            check_collisions: true,
            saved_up: Vec3::Y,
            saved_normal: Vec3::Y,
            saved_direction: Vec3::X,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn ground_direction(&self) -> Vec3 {
        self.ground_direction
    }

    /// Probe down, up, right and left; the nearest hit defines the surface
    /// the walker sticks to and the body snaps onto the hit point.
    fn find_up_vector(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        let origin = core.body.position;
        let mut hits: SmallVec<[SurfaceHit; 4]> = SmallVec::new();
        for dir in [Vec3::NEG_Y, Vec3::Y, Vec3::X, Vec3::NEG_X] {
            if let Some(hit) = env.probe.probe(origin, dir, FIND_RANGE) {
                hits.push(hit);
            }
        }

        let Some(nearest) = hits
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
        else {
            return;
        };

        core.up = nearest.normal;
        self.ground_normal = nearest.normal;
        core.body.position = nearest.point;
        self.height_from_ground = 0.0;
        self.on_ground = true;
    }

    /// Per-tick surface tracking along the current up-vector, biased a bit
    /// ahead of the walker while it moves. New normals are blended 75/25
    /// into the previous one so corners do not snap the orientation.
    fn track_surface(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if !self.check_collisions {
            return;
        }

        let mut origin = core.body.position + core.up * PROBE_RISE;
        if self.sub == SubState::Move {
            let mut ahead = core.direction;
            ahead.z = 0.0;
            origin += ahead * FORWARD_BIAS;
        }

        let mut normal = core.up;
        if let Some(hit) = env.probe.probe(origin, -core.up, PROBE_RANGE) {
            normal = (hit.normal * 0.75 + self.ground_normal * 0.25).normalize_or_zero();
            self.height_from_ground = hit.distance - HEIGHT_OFFSET;
        } else {
            self.height_from_ground = HEIGHT_SENTINEL;
        }

        if self.height_from_ground < ON_GROUND_HEIGHT {
            self.gravity = Vec3::ZERO;
        }

        self.on_ground = self.height_from_ground < ON_GROUND_HEIGHT;
        self.ground_normal = normal;
        core.up = normal;
        self.ground_direction = Vec3::NEG_Z.cross(core.up);

        env.view.height(self.height_from_ground);
    }
}

impl Locomotion for WallWalking {
    fn on_init(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.on_ground = false;
        self.check_collisions = true;

        self.find_up_vector(core, env);

        if !self.on_ground {
            core.up = Vec3::Y;
            core.start_free_fall(env);
        }

        self.ground_direction = Vec3::NEG_Z.cross(core.up);
        self.gravity = Vec3::ZERO;
        self.sub = SubState::Idle;
        self.next_sub = SubState::Idle;
    }

    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.next_sub != self.sub {
            if self.sub == SubState::Move {
                core.stop(env.view);
            }
            self.sub = self.next_sub;
        }

        core.direction = env.pilot.direction;

        self.track_surface(core, env);

        match self.sub {
            SubState::Idle => {
                if env.pilot.speed > 0.01 {
                    self.next_sub = SubState::Move;
                }
            }
            SubState::Move => {
                if env.pilot.speed <= 0.01 {
                    self.next_sub = SubState::Idle;
                }
            }
        }
    }

    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.check_collisions {
            self.gravity += -self.ground_normal * GRAVITY * env.dt;
        } else {
            self.gravity = Vec3::ZERO;
        }

        if self.sub == SubState::Idle {
            core.body.velocity = self.gravity;
        } else {
            core.velocity =
                steer_towards(core.velocity, env.pilot.impulse, core.mass, env.pilot.speed);
            core.body.velocity = core.velocity + core.external_velocity + self.gravity;
        }
    }

    fn update_free_fall(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.on_ground {
            env.signals.set(SignalMask::FALL_DOWN, false);
            self.find_up_vector(core, env);
            self.next_sub = SubState::Idle;
        }
    }

    /// Project the facing onto the surface plane so a ceiling walker looks
    /// along its ceiling, not through it.
    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3) {
        let dir = (player_position - core.body.position).normalize_or_zero();
        core.direction =
            (dir - dir.dot(self.ground_normal) * self.ground_normal).normalize_or_zero();
    }

    fn update_orientation(&mut self, core: &mut MotionCore) {
        core.target_rotation = math::look_rotation(core.direction + DEPTH_BIAS, self.ground_normal);

        if self.params.limit_horizontal_rotation {
            core.target_rotation = clamp_facing(
                core.target_rotation,
                core.direction,
                self.ground_normal,
                self.params.face_left_angle,
                self.params.face_right_angle,
            );
        }
    }

    /// Freeze or resume surface seeking. While frozen the up-vector and
    /// ground direction are parked at world defaults; re-enabling restores
    /// the saved frame.
    fn set_collision_checks(&mut self, core: &mut MotionCore, enabled: bool) {
        if self.check_collisions == enabled {
            return;
        }

        if enabled {
            self.ground_normal = self.saved_normal;
            core.up = self.saved_up;
            self.ground_direction = self.saved_direction;
        } else {
            self.saved_normal = self.ground_normal;
            self.ground_normal = Vec3::Y;

            self.saved_up = core.up;
            core.up = Vec3::Y;

            self.saved_direction = self.ground_direction;
            self.ground_direction = Vec3::NEG_Z.cross(core.up);
        }
        self.check_collisions = enabled;
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
        _core: &mut MotionCore,
        env: &mut TickEnv<'_>,
        contacts: &[ContactPoint],
    ) {
        let mut normal = Vec3::ZERO;
        for contact in contacts {
            normal += contact.normal;
        }
        let normal = normal.normalize_or_zero();
        if normal == Vec3::ZERO {
            return;
        }

        self.ground_normal = (self.ground_normal * 0.25 + normal * 0.75).normalize_or_zero();
        self.ground_direction = Vec3::NEG_Z.cross(self.ground_normal);
        self.gravity = Vec3::ZERO;

        self.height_from_ground = 0.0;
        env.view.height(0.0);
        env.view.upside_down(self.ground_normal.y < -0.5);

        self.on_ground = true;
    }

    fn ground_contact_exit(&mut self, _core: &mut MotionCore, env: &mut TickEnv<'_>) {
        self.on_ground = false;
        self.height_from_ground = HEIGHT_SENTINEL;
        env.view.height(HEIGHT_SENTINEL);
    }

    /// Wall walkers tolerate feather-light bodies; the steering math guards
    /// division itself.
    fn min_mass(&self) -> f32 {
        0.0
    }
}
