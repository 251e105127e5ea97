//! Rail wagon locomotion - kinematic travel along a track
//!
//! The wagon never simulates its own position; it reads it off the rail at
//! a monotonically growing travel distance. A slope-driven momentum scalar
//! makes descents build speed and climbs bleed it, so the ride feels like a
//! coaster instead of a conveyor. Running off the end of the track hands
//! the body back to physics via a free fall.

use glam::Vec3;

use crate::config::WagonParams;
use crate::controller::{MotionCore, TickEnv};
use crate::math::{self, DEPTH_BIAS};
use crate::rail::RailTrack;
use crate::strategy::Locomotion;

/// Momentum multiplier bounds: descents peak at twice the base speed,
/// climbs may stall into a slight rollback.
const MOMENTUM_MAX: f32 = 2.0;
const MOMENTUM_MIN: f32 = -0.1;

/// Track-bound creature with coaster momentum.
#[derive(Debug)]
pub struct Wagon {
    params: WagonParams,
    track: RailTrack,

    distance: f32,
    momentum: f32,
    travel_direction: Vec3,
    lateral: Vec3,
    finished: bool,
}

impl Wagon {
    pub fn new(params: WagonParams, track: RailTrack) -> Self {
        Self {
            params,
            track,
            distance: 0.0,
            momentum: 1.0,
            travel_direction: Vec3::X,
            lateral: Vec3::Z,
            finished: false,
        }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

impl Locomotion for Wagon {
    fn on_init(&mut self, core: &mut MotionCore, _env: &mut TickEnv<'_>) {
        self.distance = 0.0;
        self.momentum = 1.0;
        self.finished = false;

        let sample = self.track.sample(0.0);
        self.travel_direction = sample.direction;
        self.lateral = sample.right;

        core.body.kinematic = true;
        core.set_feet_position(sample.position);
        core.direction = sample.direction;
    }

    fn update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.finished {
            return;
        }

        core.direction = self.travel_direction;
        env.view.move_speed(env.pilot.speed * self.momentum.max(0.0));

        if self.distance >= self.track.length() {
            log::debug!("rail complete at distance {:.2}", self.distance);
            self.finished = true;

            // hand the body back to physics, flying off the rail end
            core.body.kinematic = false;
            core.velocity = self.travel_direction * (env.pilot.speed * self.momentum.max(0.0));
            core.body.velocity = core.velocity;
            core.up = self.lateral.cross(self.travel_direction).normalize_or_zero();
            core.start_free_fall(env);
        }
    }

    fn fixed_update(&mut self, core: &mut MotionCore, env: &mut TickEnv<'_>) {
        if self.finished {
            return;
        }

        // downhill slope is positive when the track drops
        let slope = -self.travel_direction.y;
        if slope > 0.0 {
            self.momentum += slope * self.params.descent_gain * env.dt;
        } else {
            self.momentum += slope * self.params.climb_decay * env.dt;
        }
        self.momentum = self.momentum.clamp(MOMENTUM_MIN, MOMENTUM_MAX);

        self.distance += env.pilot.speed * self.momentum * env.dt;
        self.distance = self.distance.max(0.0);

        let sample = self.track.sample(self.distance);
        self.travel_direction = sample.direction;
        self.lateral = sample.right;
        core.set_feet_position(sample.position);
        core.direction = sample.direction;
    }

    /// Wagons stay ballistic after leaving the rail; nothing re-rails them.
    fn update_free_fall(&mut self, _core: &mut MotionCore, _env: &mut TickEnv<'_>) {}

    fn face_player(&mut self, core: &mut MotionCore, player_position: Vec3) {
        core.direction = (player_position - core.feet_position()).normalize_or_zero();
    }

    fn update_orientation(&mut self, core: &mut MotionCore) {
        core.target_rotation = math::look_rotation(core.direction + DEPTH_BIAS, core.up);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MotionParams;
    use crate::controller::Anchors;
    use crate::pilot::Pilot;
    use crate::signals::{SignalBus, SignalMask};
    use crate::surface::NoSurface;
    use crate::view::ViewLog;

    fn core() -> MotionCore {
        MotionCore::new(MotionParams::default(), Anchors::default(), Vec3::ZERO)
    }

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

        fn env(&mut self, dt: f32) -> TickEnv<'_> {
            TickEnv {
                pilot: &mut self.pilot,
                signals: &mut self.signals,
                view: &mut self.view,
                probe: &NoSurface,
                player_position: Vec3::ZERO,
                enemy_position: None,
                dt,
            }
        }
    }

    fn flat_track() -> RailTrack {
        RailTrack::new(vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)]).unwrap()
    }

    fn drop_track() -> RailTrack {
        RailTrack::new(vec![Vec3::ZERO, Vec3::new(0.0, -10.0, 0.0)]).unwrap()
    }

    fn climb_track() -> RailTrack {
        RailTrack::new(vec![Vec3::ZERO, Vec3::new(0.0, 10.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_position_comes_from_track_sample() {
        let mut fx = Fixture::new();
        let mut core = core();
        let mut wagon = Wagon::new(WagonParams::default(), flat_track());
        wagon.on_init(&mut core, &mut fx.env(0.1));
        assert!(core.body.kinematic);

        fx.pilot.speed = 2.0;
        wagon.fixed_update(&mut core, &mut fx.env(0.5));
        // flat track keeps the momentum multiplier at 1
        assert!((wagon.distance() - 1.0).abs() < 1e-5);
        assert!((core.feet_position() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_descent_builds_momentum_up_to_double() {
        let mut fx = Fixture::new();
        let mut core = core();
        let mut wagon = Wagon::new(WagonParams::default(), drop_track());
        wagon.on_init(&mut core, &mut fx.env(0.1));

        fx.pilot.speed = 1.0;
        for _ in 0..20 {
            wagon.fixed_update(&mut core, &mut fx.env(0.1));
        }
        assert!((wagon.momentum() - MOMENTUM_MAX).abs() < 1e-5);
    }

    #[test]
    fn test_climb_decays_momentum_to_slight_rollback() {
        let mut fx = Fixture::new();
        let mut core = core();
        let mut wagon = Wagon::new(WagonParams::default(), climb_track());
        wagon.on_init(&mut core, &mut fx.env(0.1));

        fx.pilot.speed = 1.0;
        for _ in 0..30 {
            wagon.fixed_update(&mut core, &mut fx.env(0.1));
        }
        assert!((wagon.momentum() - MOMENTUM_MIN).abs() < 1e-5);
        // rollback never pushes the wagon off the start of the track
        assert!(wagon.distance() >= 0.0);
    }

    #[test]
    fn test_rail_completion_triggers_free_fall() {
        let mut fx = Fixture::new();
        let mut core = core();
        let mut wagon = Wagon::new(WagonParams::default(), flat_track());
        wagon.on_init(&mut core, &mut fx.env(0.1));

        fx.pilot.speed = 5.0;
        for _ in 0..30 {
            wagon.fixed_update(&mut core, &mut fx.env(0.1));
            wagon.update(&mut core, &mut fx.env(0.1));
            if wagon.finished() {
                break;
            }
        }

        assert!(wagon.finished());
        assert!(fx.signals.get(SignalMask::FALL_DOWN));
        assert!(!core.body.kinematic);
        // launch velocity follows the last travel direction
        assert!((core.velocity.normalize() - Vec3::X).length() < 1e-5);
        // lateral x direction recovers the rail's up
        assert_eq!(core.up, Vec3::Y);
    }

    #[test]
    fn test_finished_wagon_stops_sampling() {
        let mut fx = Fixture::new();
        let mut core = core();
        let mut wagon = Wagon::new(WagonParams::default(), flat_track());
        wagon.on_init(&mut core, &mut fx.env(0.1));

        fx.pilot.speed = 100.0;
        wagon.fixed_update(&mut core, &mut fx.env(1.0));
        wagon.update(&mut core, &mut fx.env(0.1));
        assert!(wagon.finished());

        let pos = core.body.position;
        wagon.fixed_update(&mut core, &mut fx.env(1.0));
        assert_eq!(core.body.position, pos);
    }
}
