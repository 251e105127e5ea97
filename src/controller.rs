//! Motion controller - the per-entity locomotion state machine
//!
//! Owns the physics body and the top-level motion state, and defers the
//! model-specific physics to a boxed [`Locomotion`] strategy. The host
//! simulation loop drives three phases in a fixed order every tick:
//!
//! 1. `advance_logic`   - state transitions, intent and view forwarding
//! 2. `integrate_physics` - velocity/gravity integration, orientation blend
//! 3. `finalize_frame`  - latch position blending, last-position bookkeeping
//!
//! State decided in phase 1 must be visible to phase 2 within the same tick,
//! so the phases must not be reordered or skipped.

use glam::{Quat, Vec3};

use crate::body::RigidBody;
use crate::config::MotionParams;
use crate::math::{self, DEPTH_BIAS};
use crate::pilot::{ActionMask, Pilot};
use crate::signals::{SignalBus, SignalMask};
use crate::strategy::Locomotion;
use crate::surface::{ContactPoint, SurfaceProbe};
use crate::view::ViewProxy;

pub(crate) const GRAVITY: f32 = 9.8;
const AIR_DENSITY: f32 = 1.293;
const DRAG: f32 = 1.3; // human; 0.47 would be a sphere

/// Height reported to the view when nothing supports the entity.
pub(crate) const HEIGHT_SENTINEL: f32 = 100.0;

/// Fallback duration of the stand-up recovery state.
const STAND_UP_TIME: f32 = 2.0;

/// Top-level motion state. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Free,
    Biting,
    Latching,
    Locked,
    Panic,
    FreeFall,
    StandUp,
    InLove,
}

/// Named child anchors resolved at attach time, as local offsets from the
/// body origin. All of them are optional; dependent features degrade to
/// no-ops when an anchor is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anchors {
    /// Aiming reference.
    pub eye: Option<Vec3>,
    /// Latch blending reference.
    pub mouth: Option<Vec3>,
    /// Ground sensor; its offset below the origin defines the feet position.
    pub ground_sensor: Option<Vec3>,
}

/// Collaborators handed to every tick call. The controller owns nothing in
/// here; combat, perception and the host loop own these and lend them for
/// the duration of one phase call.
pub struct TickEnv<'a> {
    pub pilot: &'a mut Pilot,
    pub signals: &'a mut SignalBus,
    pub view: &'a mut dyn ViewProxy,
    pub probe: &'a dyn SurfaceProbe,
    /// Player-controlled entity, faced while in love or caged.
    pub player_position: Vec3,
    /// Current aim target, if perception found one.
    pub enemy_position: Option<Vec3>,
    /// Simulation step in seconds.
    pub dt: f32,
}

/// Kinematic frame plus state-machine bookkeeping, shared with the active
/// strategy on every hook call.
#[derive(Debug)]
pub struct MotionCore {
    pub params: MotionParams,
    pub body: RigidBody,

    /// Effective mass after the strategy-specific clamp.
    pub mass: f32,
    /// Current travel facing.
    pub direction: Vec3,
    /// Orientation reference; not always world-up (wall walkers).
    pub up: Vec3,
    pub target_rotation: Quat,
    /// Velocity the controller wants; mirrored into the body by the
    /// strategies and the free-fall integrator.
    pub velocity: Vec3,
    /// Knockback and similar externally injected velocity.
    pub external_velocity: Vec3,
    pub terminal_velocity: f32,
    /// Current world point the creature bends its attack toward.
    pub attack_target: Option<Vec3>,

    rotation: Quat,
    sensor_offset: f32,
    eye: Option<Vec3>,
    mouth: Option<Vec3>,
    latch_blend: f32,
    standup_timer: f32,
    last_position: Vec3,
    state: MotionState,
    next_state: MotionState,
}

impl MotionCore {
    pub(crate) fn new(params: MotionParams, anchors: Anchors, spawn_position: Vec3) -> Self {
        Self {
            params,
            body: RigidBody::new(spawn_position),
            mass: params.mass,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            target_rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            external_velocity: Vec3::ZERO,
            terminal_velocity: 0.0,
            attack_target: None,
            rotation: Quat::IDENTITY,
            sensor_offset: anchors.ground_sensor.map(|o| o.length()).unwrap_or(0.0),
            eye: anchors.eye,
            mouth: anchors.mouth,
            latch_blend: 0.0,
            standup_timer: 0.0,
            last_position: spawn_position,
            state: MotionState::Free,
            next_state: MotionState::Free,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Ground-sensor position: the body origin shifted down along the
    /// current up-vector.
    pub fn feet_position(&self) -> Vec3 {
        self.body.position - self.up * self.sensor_offset
    }

    /// Place the entity so its feet land on `position`.
    pub fn set_feet_position(&mut self, position: Vec3) {
        self.body.position = position + self.up * self.sensor_offset;
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Snap the orientation, bypassing blending (spawn/teleport).
    pub fn set_orientation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.target_rotation = rotation;
        self.body.rotation = rotation;
    }

    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    /// Request a transition into free fall: flags the fall on the bus so
    /// other subsystems see it and tells the view to blend toward falling.
    pub fn start_free_fall(&mut self, env: &mut TickEnv<'_>) {
        if self.state != MotionState::FreeFall {
            env.view.height(HEIGHT_SENTINEL);
            env.signals.set(SignalMask::FALL_DOWN, true);
            self.next_state = MotionState::FreeFall;
        }
    }

    /// Kill all motion unless falling; falling entities keep their momentum.
    pub fn stop(&mut self, view: &mut dyn ViewProxy) {
        if self.state != MotionState::FreeFall {
            self.velocity = Vec3::ZERO;
            self.body.zero_motion();
            view.move_speed(0.0);
        }
    }

    fn integrate_free_fall(&mut self, env: &mut TickEnv<'_>) {
        let acceleration = Vec3::NEG_Y * GRAVITY;

        let mut terminal = self.terminal_velocity;
        if env.signals.get(SignalMask::IN_WATER) {
            terminal *= 0.5;
        }

        self.velocity += acceleration * env.dt;
        self.velocity = self.velocity.clamp_length_max(terminal) + self.external_velocity;
        self.body.angular_velocity = Vec3::ZERO;
        self.body.velocity = self.velocity;
    }

    fn update_attack(&mut self, env: &mut TickEnv<'_>) {
        if self.eye.is_some() && env.pilot.is_action_pressed(ActionMask::AIM) {
            self.update_aim(env);
        }

        if env.pilot.is_action_pressed(ActionMask::ATTACK) && env.view.can_attack() {
            env.view.attack(
                env.signals.get(SignalMask::MELEE),
                env.signals.get(SignalMask::RANGED),
            );
        } else {
            if env.view.attack_ended() {
                env.pilot.release_action(ActionMask::ATTACK);
            }
            if !env.pilot.is_action_pressed(ActionMask::ATTACK) {
                env.view.stop_attack();
            }
        }
    }

    /// Yaw toward the current enemy and feed the aim pose blend. The aim
    /// value is the depth-plane cross product, -1..1 between the two poses.
    fn update_aim(&mut self, env: &mut TickEnv<'_>) {
        let (Some(eye), Some(enemy)) = (self.eye, env.enemy_position) else {
            return;
        };
        let eye_world = self.body.position + self.rotation * eye;

        let mut target_dir = enemy - eye_world;
        target_dir.z = 0.0;
        let target_dir = target_dir.normalize_or_zero();
        let aim = -target_dir.cross(Vec3::X).z;

        let angle_side = if target_dir.x < 0.0 { 270.0 } else { 90.0 };

        let mut flat_dir = enemy - eye_world;
        flat_dir.y = 0.0;
        let flat_dir = flat_dir.normalize_or_zero();
        let aim_depth = -flat_dir.cross(Vec3::X).y;
        let yaw = aim_depth * (180.0 - angle_side) + angle_side;

        self.target_rotation = Quat::from_rotation_y(yaw.to_radians());
        env.pilot
            .set_direction(self.target_rotation * Vec3::Z, true);
        env.view.aim(aim);
    }

    /// Decide next tick's state from the signal bus. StandUp is sticky: it
    /// only leaves through its own timer or the stood-up notification.
    fn check_state(&mut self, signals: &SignalBus) {
        if self.state == MotionState::StandUp {
            return;
        }

        if !signals.get(SignalMask::BLOCKS_FREE_MOVEMENT) {
            self.next_state = if self.state == MotionState::FreeFall {
                MotionState::StandUp
            } else {
                MotionState::Free
            };
        } else if signals.get(SignalMask::LOCKED_IN_CAGE) {
            self.next_state = MotionState::Locked;
        } else if signals.get(SignalMask::FALL_DOWN) {
            self.next_state = MotionState::FreeFall;
        } else if signals.get(SignalMask::IN_LOVE) {
            self.next_state = MotionState::InLove;
        } else if signals.get(SignalMask::PANIC) {
            self.next_state = MotionState::Panic;
        } else if signals.get(SignalMask::BITING) {
            self.next_state = MotionState::Biting;
        } else if signals.get(SignalMask::LATCHING) {
            self.next_state = MotionState::Latching;
        }
    }

    fn on_stood_up(&mut self) {
        if self.state == MotionState::StandUp {
            self.next_state = MotionState::Free;
        }
    }
}

/// A motion core bound to one locomotion strategy. The strategy is fixed per
/// creature archetype; it is chosen at authoring time and never swapped.
pub struct MotionController {
    core: MotionCore,
    strategy: Box<dyn Locomotion>,
}

impl MotionController {
    /// Bind to the physics body and resolve anchors. Follow with
    /// [`MotionController::init`] before the first tick.
    pub fn attach(
        params: MotionParams,
        anchors: Anchors,
        strategy: Box<dyn Locomotion>,
        spawn_position: Vec3,
    ) -> Self {
        let mut core = MotionCore::new(params, anchors, spawn_position);
        let mut strategy = strategy;
        strategy.on_attach(&mut core);
        Self { core, strategy }
    }

    /// Resolve the configured up-vector, clamp mass, derive terminal
    /// velocity and settle the initial orientation so the first rendered
    /// frame does not snap.
    pub fn init(&mut self, env: &mut TickEnv<'_>) {
        let core = &mut self.core;

        core.up = core.params.up_axis.as_vec3();
        core.direction = Vec3::NEG_Z;
        core.velocity = Vec3::ZERO;
        core.external_velocity = Vec3::ZERO;

        core.mass = core.params.mass.max(self.strategy.min_mass());
        core.terminal_velocity = ((2.0 * core.mass * GRAVITY)
            * (AIR_DENSITY * core.params.frontal_area * DRAG))
            .sqrt();

        core.body.kinematic = false;
        core.body.detect_collisions = true;

        self.strategy.on_init(core, env);
        self.strategy.update(core, env);
        self.strategy.update_orientation(core);
        core.rotation = core.target_rotation;
        core.body.rotation = core.rotation;

        core.state = MotionState::Free;
        core.next_state = MotionState::Free;
    }

    /// Phase 1: run pending state transitions, per-state logic, intent and
    /// view forwarding, then pick next tick's state.
    pub fn advance_logic(&mut self, env: &mut TickEnv<'_>) {
        if self.core.next_state != self.core.state {
            self.change_state(env);
        }

        let core = &mut self.core;
        match core.state {
            MotionState::Free => {
                if !env.view.hit_anim_active() {
                    self.strategy.update(core, env);
                    self.strategy.update_orientation(core);

                    env.view.move_speed(env.pilot.speed);
                    core.update_attack(env);

                    if env.view.has_navigation_layer() {
                        env.view.navigation_layer(core.direction + DEPTH_BIAS);
                    }
                }
            }

            // Hit/struggle animations own the body; stop blending toward a
            // stale goal until the state clears.
            MotionState::Biting | MotionState::Panic => {
                core.target_rotation = core.rotation;
            }

            MotionState::Latching => {}

            MotionState::Locked => {
                let mut to_player = env.player_position - core.feet_position();
                to_player.y = 0.0;
                core.direction = to_player.normalize_or_zero();

                core.update_attack(env);

                core.direction = (core.direction + DEPTH_BIAS).cross(Vec3::NEG_Y);
                core.up = Vec3::Y;
                core.target_rotation =
                    math::look_rotation(core.direction.cross(core.up), core.up);
            }

            MotionState::FreeFall => {
                self.strategy.update_free_fall(core, env);
            }

            MotionState::StandUp => {
                core.standup_timer -= env.dt;
                if core.standup_timer <= 0.0 {
                    log::debug!("stand-up fallback timer elapsed");
                    core.on_stood_up();
                }
            }

            MotionState::InLove => {
                self.strategy.face_player(core, env.player_position);
                self.strategy.update_orientation(core);
                env.view.stop_attack();
            }
        }

        // Bend the navigation layer toward whatever we are attacking.
        if let Some(target) = core.attack_target {
            let dir = (target - core.feet_position()).normalize_or_zero();
            env.view.navigation_layer(dir + DEPTH_BIAS);
        } else {
            env.view.navigation_layer(core.direction + DEPTH_BIAS);
        }

        env.view.rotation_layer(core.rotation, core.target_rotation);
        env.view
            .boost(env.pilot.is_action_pressed(ActionMask::BOOST));

        core.check_state(env.signals);
    }

    /// Phase 2: velocity/gravity integration and orientation blending.
    pub fn integrate_physics(&mut self, env: &mut TickEnv<'_>) {
        let core = &mut self.core;
        match core.state {
            MotionState::Free => self.strategy.fixed_update(core, env),
            MotionState::FreeFall => core.integrate_free_fall(env),
            _ => {}
        }

        if core.params.use_angular_velocity {
            core.body.angular_velocity = math::angular_velocity_for_blend(
                core.body.rotation,
                core.target_rotation,
                core.params.orientation_speed,
            );
        } else {
            core.rotation = math::rotate_towards(
                core.rotation,
                core.target_rotation,
                core.params.orientation_speed.to_radians() * env.dt,
            );
            core.body.rotation = core.rotation;
        }

        core.body.integrate(env.dt);
    }

    /// Phase 3: latch target blending and last-position bookkeeping.
    pub fn finalize_frame(&mut self, env: &mut TickEnv<'_>) {
        let core = &mut self.core;
        if core.state == MotionState::Latching && env.signals.get(SignalMask::LATCHING) {
            core.latch_blend = (core.latch_blend + env.dt).min(1.0);
            if let Some(mouth) = core.mouth {
                let mouth_offset = -(core.rotation * mouth);
                core.body.position = core
                    .body
                    .position
                    .lerp(env.pilot.target + mouth_offset, core.latch_blend);
            }
        }

        core.last_position = core.feet_position();
    }

    fn change_state(&mut self, env: &mut TickEnv<'_>) {
        let core = &mut self.core;

        // leave current state
        match core.state {
            MotionState::Latching => {
                core.stop(env.view);
                core.body.kinematic = false;
                core.body.detect_collisions = true;
                core.latch_blend = 0.0;
            }
            MotionState::Locked => {
                core.body.use_gravity = false;
                env.view.scared(false);
                self.strategy.ground_contact_exit(core, env);
            }
            MotionState::Panic => {
                env.view.panic(false, env.signals.get(SignalMask::BURNING));
            }
            MotionState::FreeFall => {
                env.view.falling(false);
            }
            _ => {}
        }

        log::debug!("motion state {:?} -> {:?}", core.state, core.next_state);
        core.state = core.next_state;

        // enter next state
        match core.state {
            MotionState::Latching => {
                core.body.kinematic = true;
                core.body.detect_collisions = false;
            }
            MotionState::Locked => {
                core.body.use_gravity = true;
                env.view.scared(true);
                core.stop(env.view);
            }
            MotionState::Panic => {
                env.view.panic(true, env.signals.get(SignalMask::BURNING));
            }
            MotionState::FreeFall => {
                self.strategy.on_free_fall(core);
                env.view.falling(true);
            }
            MotionState::StandUp => {
                core.stop(env.view);
                core.standup_timer = STAND_UP_TIME;
            }
            MotionState::InLove => {
                env.view.stop_attack();
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Explicit triggers
    // ------------------------------------------------------------------

    /// Inject a velocity (impacts, throws). The strategy may react, e.g.
    /// ground jumpers leave their takeoff sub-state.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.core.velocity = velocity;
        self.strategy.on_set_velocity(&mut self.core);
    }

    pub fn stop(&mut self, view: &mut dyn ViewProxy) {
        self.core.stop(view);
    }

    pub fn start_free_fall(&mut self, env: &mut TickEnv<'_>) {
        self.core.start_free_fall(env);
    }

    /// Animation event: the stand-up clip finished.
    pub fn notify_stood_up(&mut self) {
        self.core.on_stood_up();
    }

    /// Suspend or resume surface seeking (wall walkers only; a no-op for
    /// every other strategy). Used by choreographed sequences.
    pub fn set_collision_checks(&mut self, enabled: bool) {
        self.strategy.set_collision_checks(&mut self.core, enabled);
    }

    // ------------------------------------------------------------------
    // Collision notifications from the host engine
    // ------------------------------------------------------------------

    pub fn ground_contact_enter(&mut self, env: &mut TickEnv<'_>, contacts: &[ContactPoint]) {
        self.strategy
            .ground_contact_enter(&mut self.core, env, contacts);
    }

    pub fn ground_contact_stay(&mut self, env: &mut TickEnv<'_>, contacts: &[ContactPoint]) {
        self.strategy
            .ground_contact_stay(&mut self.core, env, contacts);
    }

    pub fn ground_contact_exit(&mut self, env: &mut TickEnv<'_>) {
        self.strategy.ground_contact_exit(&mut self.core, env);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> MotionState {
        self.core.state
    }

    pub fn is_in_free_fall(&self) -> bool {
        self.core.state == MotionState::FreeFall
    }

    pub fn position(&self) -> Vec3 {
        self.core.feet_position()
    }

    pub fn velocity(&self) -> Vec3 {
        self.core.velocity
    }

    pub fn orientation(&self) -> Quat {
        self.core.rotation
    }

    pub fn direction(&self) -> Vec3 {
        self.core.direction
    }

    pub fn up_vector(&self) -> Vec3 {
        self.core.up
    }

    pub fn set_attack_target(&mut self, target: Option<Vec3>) {
        self.core.attack_target = target;
    }

    pub fn set_external_velocity(&mut self, velocity: Vec3) {
        self.core.external_velocity = velocity;
    }

    pub fn body(&self) -> &RigidBody {
        &self.core.body
    }

    pub fn core(&self) -> &MotionCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut MotionCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroundParams, WallWalkingParams};
    use crate::strategy::{Ground, WallWalking};
    use crate::surface::{NoSurface, PlaneProbe, SurfaceProbe};
    use crate::view::{ViewEvent, ViewLog};

    struct Fixture {
        pilot: Pilot,
        signals: SignalBus,
        view: ViewLog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pilot: Pilot::new(),
                signals: SignalBus::new(),
                view: ViewLog::new(),
            }
        }

        fn env<'a>(&'a mut self, probe: &'a dyn SurfaceProbe, dt: f32) -> TickEnv<'a> {
            TickEnv {
                pilot: &mut self.pilot,
                signals: &mut self.signals,
                view: &mut self.view,
                probe,
                player_position: Vec3::ZERO,
                enemy_position: None,
                dt,
            }
        }
    }

    fn walker(params: MotionParams, anchors: Anchors) -> MotionController {
        MotionController::attach(
            params,
            anchors,
            Box::new(Ground::new(GroundParams::default())),
            Vec3::ZERO,
        )
    }

    fn ticked_walker(fx: &mut Fixture, probe: &dyn SurfaceProbe) -> MotionController {
        let mut ctl = walker(MotionParams::default(), Anchors::default());
        ctl.init(&mut fx.env(probe, 0.1));
        ctl
    }

    /// Reference copy of the transition priority, kept deliberately dumb.
    fn expected_next(signals: &SignalBus, was_free_fall: bool) -> MotionState {
        if signals.get(SignalMask::LOCKED_IN_CAGE) {
            MotionState::Locked
        } else if signals.get(SignalMask::FALL_DOWN) {
            MotionState::FreeFall
        } else if signals.get(SignalMask::IN_LOVE) {
            MotionState::InLove
        } else if signals.get(SignalMask::PANIC) {
            MotionState::Panic
        } else if signals.get(SignalMask::BITING) {
            MotionState::Biting
        } else if signals.get(SignalMask::LATCHING) {
            MotionState::Latching
        } else if was_free_fall {
            MotionState::StandUp
        } else {
            MotionState::Free
        }
    }

    #[test]
    fn test_priority_table_full_enumeration() {
        let flags = [
            SignalMask::FALL_DOWN,
            SignalMask::PANIC,
            SignalMask::BITING,
            SignalMask::LATCHING,
            SignalMask::LOCKED_IN_CAGE,
            SignalMask::IN_LOVE,
        ];

        for combo in 0u32..(1 << flags.len()) {
            let mut signals = SignalBus::new();
            for (i, flag) in flags.iter().enumerate() {
                signals.set(*flag, combo & (1 << i) != 0);
            }

            for was_free_fall in [false, true] {
                let mut core =
                    MotionCore::new(MotionParams::default(), Anchors::default(), Vec3::ZERO);
                core.state = if was_free_fall {
                    MotionState::FreeFall
                } else {
                    MotionState::Free
                };
                core.next_state = core.state;

                core.check_state(&signals);
                assert_eq!(
                    core.next_state,
                    expected_next(&signals, was_free_fall),
                    "combo {:#08b}, was_free_fall {}",
                    combo,
                    was_free_fall
                );
            }
        }
    }

    #[test]
    fn test_stand_up_ignores_signal_table() {
        let mut signals = SignalBus::new();
        signals.set(SignalMask::PANIC, true);

        let mut core = MotionCore::new(MotionParams::default(), Anchors::default(), Vec3::ZERO);
        core.state = MotionState::StandUp;
        core.next_state = MotionState::StandUp;

        core.check_state(&signals);
        assert_eq!(core.next_state, MotionState::StandUp);
    }

    #[test]
    fn test_init_settles_orientation_without_snap() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        fx.pilot.direction = Vec3::X;

        let mut ctl = walker(MotionParams::default(), Anchors::default());
        ctl.init(&mut fx.env(&floor, 0.1));

        assert_eq!(ctl.state(), MotionState::Free);
        assert_eq!(ctl.core.rotation, ctl.core.target_rotation);
        assert_eq!(ctl.body().rotation, ctl.core.target_rotation);
    }

    #[test]
    fn test_mass_clamped_to_one_for_walkers() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();

        let mut params = MotionParams::default();
        params.mass = 0.2;
        let mut ctl = walker(params, Anchors::default());
        ctl.init(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.core().mass, 1.0);
    }

    #[test]
    fn test_wall_walkers_keep_sub_unit_mass() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();

        let mut params = MotionParams::default();
        params.mass = 0.2;
        let mut ctl = MotionController::attach(
            params,
            Anchors::default(),
            Box::new(WallWalking::new(WallWalkingParams::default())),
            Vec3::new(0.0, 1.0, 0.0),
        );
        ctl.init(&mut fx.env(&floor, 0.1));
        assert!((ctl.core().mass - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_velocity_formula_and_water_halving() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();

        let mut params = MotionParams::default();
        params.mass = 4.0;
        params.frontal_area = 2.0;
        let mut ctl = walker(params, Anchors::default());
        ctl.init(&mut fx.env(&floor, 0.1));

        let expected = (2.0 * 4.0 * GRAVITY * (AIR_DENSITY * 2.0 * DRAG)).sqrt();
        assert!((ctl.core().terminal_velocity - expected).abs() < 1e-4);

        // falling fast enough to sit on the clamp
        ctl.core.state = MotionState::FreeFall;
        ctl.core.velocity = Vec3::NEG_Y * 1000.0;
        ctl.integrate_physics(&mut fx.env(&NoSurface, 0.1));
        assert!((ctl.core().velocity.length() - expected).abs() < 1e-3);

        // submerged free fall halves the clamp
        fx.signals.set(SignalMask::IN_WATER, true);
        ctl.core.velocity = Vec3::NEG_Y * 1000.0;
        ctl.integrate_physics(&mut fx.env(&NoSurface, 0.1));
        assert!((ctl.core().velocity.length() - expected * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_locked_recovery_scenario() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        ctl.core.velocity = Vec3::X * 3.0;
        fx.signals.set(SignalMask::LOCKED_IN_CAGE, true);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));

        assert_eq!(ctl.state(), MotionState::Locked);
        assert_eq!(ctl.velocity(), Vec3::ZERO);
        assert!(ctl.body().use_gravity);
        assert!(fx.view.saw(&ViewEvent::Scared(true)));

        fx.signals.set(SignalMask::LOCKED_IN_CAGE, false);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));

        assert_eq!(ctl.state(), MotionState::Free);
        assert!(!ctl.body().use_gravity);
        assert!(fx.view.saw(&ViewEvent::Scared(false)));
    }

    #[test]
    fn test_stand_up_fallback_timer() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        // land from a fall with the signal already cleared and no stood-up
        // notification ever arriving
        ctl.core.state = MotionState::FreeFall;
        ctl.core.next_state = MotionState::FreeFall;
        fx.signals.set(SignalMask::FALL_DOWN, false);

        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::StandUp);

        let mut elapsed: f32 = 0.0;
        while ctl.state() == MotionState::StandUp && elapsed < 5.0 {
            ctl.advance_logic(&mut fx.env(&floor, 0.1));
            elapsed += 0.1;
        }

        assert_eq!(ctl.state(), MotionState::Free);
        assert!((elapsed - 2.1).abs() < 0.11);
    }

    #[test]
    fn test_stood_up_notification_ends_recovery_early() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        ctl.core.state = MotionState::FreeFall;
        ctl.core.next_state = MotionState::FreeFall;
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::StandUp);

        ctl.notify_stood_up();
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::Free);
    }

    #[test]
    fn test_latching_makes_body_kinematic_and_blends_to_target() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();

        let anchors = Anchors {
            mouth: Some(Vec3::new(0.0, 0.5, 0.0)),
            ..Anchors::default()
        };
        let mut ctl = walker(MotionParams::default(), anchors);
        ctl.init(&mut fx.env(&floor, 0.1));

        fx.signals.set(SignalMask::LATCHING, true);
        fx.pilot.target = Vec3::new(5.0, 3.0, 0.0);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::Latching);
        assert!(ctl.body().kinematic);
        assert!(!ctl.body().detect_collisions);

        let goal = fx.pilot.target - ctl.orientation() * Vec3::new(0.0, 0.5, 0.0);
        let start_gap = (ctl.body().position - goal).length();
        for _ in 0..20 {
            ctl.finalize_frame(&mut fx.env(&floor, 0.1));
        }
        let end_gap = (ctl.body().position - goal).length();
        assert!(end_gap < start_gap * 0.01);

        // releasing the latch restores normal collision response
        fx.signals.set(SignalMask::LATCHING, false);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::Free);
        assert!(!ctl.body().kinematic);
        assert!(ctl.body().detect_collisions);
    }

    #[test]
    fn test_panic_cue_carries_burning_signal() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        fx.signals.set(SignalMask::PANIC, true);
        fx.signals.set(SignalMask::BURNING, true);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::Panic);
        assert!(fx.view.saw(&ViewEvent::Panic(true, true)));

        fx.signals.set(SignalMask::PANIC, false);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert!(fx.view.saw(&ViewEvent::Panic(false, true)));
    }

    #[test]
    fn test_biting_freezes_orientation_goal() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        ctl.core.target_rotation = Quat::from_rotation_y(1.0);
        fx.signals.set(SignalMask::BITING, true);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));

        assert_eq!(ctl.state(), MotionState::Biting);
        assert_eq!(ctl.core.target_rotation, ctl.core.rotation);
    }

    #[test]
    fn test_attack_handshake_uses_signal_mix() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        fx.signals.set(SignalMask::MELEE, true);
        fx.pilot.press_action(ActionMask::ATTACK);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert!(fx.view.saw(&ViewEvent::Attack(true, false)));

        // once released the view is told to wind down
        fx.pilot.release_action(ActionMask::ATTACK);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert!(fx.view.saw(&ViewEvent::StopAttack));
    }

    #[test]
    fn test_stop_keeps_momentum_while_falling() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        ctl.core.state = MotionState::FreeFall;
        ctl.core.velocity = Vec3::NEG_Y * 4.0;
        ctl.stop(&mut fx.view);
        assert_eq!(ctl.velocity(), Vec3::NEG_Y * 4.0);

        ctl.core.state = MotionState::Free;
        ctl.stop(&mut fx.view);
        assert_eq!(ctl.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_orientation_blend_respects_speed_limit() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        let start = ctl.orientation();
        ctl.core.target_rotation = start * Quat::from_rotation_y(std::f32::consts::PI);
        ctl.integrate_physics(&mut fx.env(&floor, 0.1));

        // 120 deg/s at dt 0.1 allows a 12 degree step
        let step = ctl.orientation().angle_between(start).to_degrees();
        assert!((step - 12.0).abs() < 0.1);
    }

    #[test]
    fn test_angular_velocity_mode_writes_body_spin() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();

        let mut params = MotionParams::default();
        params.use_angular_velocity = true;
        let mut ctl = walker(params, Anchors::default());
        ctl.init(&mut fx.env(&floor, 0.1));

        ctl.core.target_rotation = ctl.core.rotation * Quat::from_rotation_y(1.0);
        ctl.integrate_physics(&mut fx.env(&floor, 0.1));
        assert!(ctl.body().angular_velocity.length() > 0.0);
    }

    #[test]
    fn test_in_love_faces_player_and_stops_attacking() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        fx.signals.set(SignalMask::IN_LOVE, true);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));

        assert_eq!(ctl.state(), MotionState::InLove);
        assert!(fx.view.saw(&ViewEvent::StopAttack));
    }

    #[test]
    fn test_free_fall_enter_and_exit_view_cues() {
        let floor = PlaneProbe::new(0.0);
        let mut fx = Fixture::new();
        let mut ctl = ticked_walker(&mut fx, &floor);

        fx.signals.set(SignalMask::FALL_DOWN, true);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::FreeFall);
        assert!(fx.view.saw(&ViewEvent::Falling(true)));

        fx.signals.set(SignalMask::FALL_DOWN, false);
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        ctl.advance_logic(&mut fx.env(&floor, 0.1));
        assert_eq!(ctl.state(), MotionState::StandUp);
        assert!(fx.view.saw(&ViewEvent::Falling(false)));
    }
}
