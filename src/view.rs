//! View proxy - the animation-facing side of the motion controller
//!
//! Motion pushes fire-and-forget cues (speed, height, falling, panic...)
//! into this trait and the view layer turns them into skeletal animation.
//! Three small queries flow the other way; they have permissive defaults so
//! a pure sink implementation still drives a correct state machine.

use glam::{Quat, Vec3};

/// Animation sink + the few queries motion needs back from the view.
pub trait ViewProxy {
    /// Current locomotion speed, drives the walk/run blend.
    fn move_speed(&mut self, speed: f32);
    /// Height above ground, drives the fall/land blend.
    fn height(&mut self, height: f32);
    fn jumping(&mut self, active: bool);
    fn falling(&mut self, active: bool);
    fn panic(&mut self, active: bool, burning: bool);
    fn scared(&mut self, active: bool);
    /// Start an attack using whichever animation sets are available.
    fn attack(&mut self, melee: bool, ranged: bool);
    fn stop_attack(&mut self);
    /// Blend factor between aim poses, -1..1.
    fn aim(&mut self, blend: f32);
    fn boost(&mut self, active: bool);
    fn upside_down(&mut self, active: bool);
    /// Orientation blending inputs for additive rotation layers.
    fn rotation_layer(&mut self, current: Quat, target: Quat);
    /// Steering direction for the navigation (look-at) layer.
    fn navigation_layer(&mut self, direction: Vec3);

    /// False while an attack animation is still winding up or recovering.
    fn can_attack(&self) -> bool {
        true
    }
    /// True once the current attack animation has finished.
    fn attack_ended(&self) -> bool {
        true
    }
    /// True while a hit reaction animation suppresses locomotion.
    fn hit_anim_active(&self) -> bool {
        false
    }
    /// Whether this view has a navigation layer worth feeding.
    fn has_navigation_layer(&self) -> bool {
        false
    }
}

/// View proxy that drops every cue. Used by headless hosts.
#[derive(Debug, Default)]
pub struct NullView;

impl ViewProxy for NullView {
    fn move_speed(&mut self, _speed: f32) {}
    fn height(&mut self, _height: f32) {}
    fn jumping(&mut self, _active: bool) {}
    fn falling(&mut self, _active: bool) {}
    fn panic(&mut self, _active: bool, _burning: bool) {}
    fn scared(&mut self, _active: bool) {}
    fn attack(&mut self, _melee: bool, _ranged: bool) {}
    fn stop_attack(&mut self) {}
    fn aim(&mut self, _blend: f32) {}
    fn boost(&mut self, _active: bool) {}
    fn upside_down(&mut self, _active: bool) {}
    fn rotation_layer(&mut self, _current: Quat, _target: Quat) {}
    fn navigation_layer(&mut self, _direction: Vec3) {}
}

/// Cue recorded by [`ViewLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Move(f32),
    Height(f32),
    Jumping(bool),
    Falling(bool),
    Panic(bool, bool),
    Scared(bool),
    Attack(bool, bool),
    StopAttack,
    Aim(f32),
    Boost(bool),
    UpsideDown(bool),
}

/// Recording view proxy for tests and debugging overlays.
#[derive(Debug, Default)]
pub struct ViewLog {
    pub events: Vec<ViewEvent>,
    pub last_nav_direction: Option<Vec3>,
}

impl ViewLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `event` was recorded at least once.
    pub fn saw(&self, event: &ViewEvent) -> bool {
        self.events.contains(event)
    }

    /// Last recorded move speed, if any.
    pub fn last_move_speed(&self) -> Option<f32> {
        self.events.iter().rev().find_map(|e| match e {
            ViewEvent::Move(s) => Some(*s),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.last_nav_direction = None;
    }
}

impl ViewProxy for ViewLog {
    fn move_speed(&mut self, speed: f32) {
        self.events.push(ViewEvent::Move(speed));
    }
    fn height(&mut self, height: f32) {
        self.events.push(ViewEvent::Height(height));
    }
    fn jumping(&mut self, active: bool) {
        self.events.push(ViewEvent::Jumping(active));
    }
    fn falling(&mut self, active: bool) {
        self.events.push(ViewEvent::Falling(active));
    }
    fn panic(&mut self, active: bool, burning: bool) {
        self.events.push(ViewEvent::Panic(active, burning));
    }
    fn scared(&mut self, active: bool) {
        self.events.push(ViewEvent::Scared(active));
    }
    fn attack(&mut self, melee: bool, ranged: bool) {
        self.events.push(ViewEvent::Attack(melee, ranged));
    }
    fn stop_attack(&mut self) {
        self.events.push(ViewEvent::StopAttack);
    }
    fn aim(&mut self, blend: f32) {
        self.events.push(ViewEvent::Aim(blend));
    }
    fn boost(&mut self, active: bool) {
        self.events.push(ViewEvent::Boost(active));
    }
    fn upside_down(&mut self, active: bool) {
        self.events.push(ViewEvent::UpsideDown(active));
    }
    fn rotation_layer(&mut self, _current: Quat, _target: Quat) {}
    fn navigation_layer(&mut self, direction: Vec3) {
        self.last_nav_direction = Some(direction);
    }
}
