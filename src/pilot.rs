//! Pilot - the intent provider feeding the motion controller
//!
//! The brain layer (AI behaviours or player input) writes desired direction,
//! speed and discrete action requests here. Motion consumes the snapshot
//! every tick and releases actions once they are handled.

use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    /// Discrete action requests. They stay pressed until released.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ActionMask: u16 {
        const JUMP     = 1 << 0;
        const ATTACK   = 1 << 1;
        const AIM      = 1 << 2;
        const STOP     = 1 << 3;
        const BOOST    = 1 << 4;
        const BUTTON_A = 1 << 5;
        const BUTTON_B = 1 << 6;
        const BUTTON_C = 1 << 7;
    }
}

/// Movement intent for one entity.
#[derive(Debug, Clone)]
pub struct Pilot {
    /// Desired travel direction (unit length, or zero when idle).
    pub direction: Vec3,
    /// Desired speed in units per second.
    pub speed: f32,
    /// Desired velocity this tick (direction scaled by speed plus avoidance).
    pub impulse: Vec3,
    /// World point used while latching onto a target.
    pub target: Vec3,
    actions: ActionMask,
    direction_forced: bool,
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Pilot {
    pub fn new() -> Self {
        Self {
            direction: Vec3::NEG_Z,
            speed: 0.0,
            impulse: Vec3::ZERO,
            target: Vec3::ZERO,
            actions: ActionMask::empty(),
            direction_forced: false,
        }
    }

    pub fn is_action_pressed(&self, action: ActionMask) -> bool {
        self.actions.intersects(action)
    }

    pub fn press_action(&mut self, action: ActionMask) {
        self.actions.insert(action);
    }

    pub fn release_action(&mut self, action: ActionMask) {
        self.actions.remove(action);
    }

    /// Override the travel direction. A forced direction tells the brain
    /// layer not to overwrite it until the current move finishes.
    pub fn set_direction(&mut self, direction: Vec3, forced: bool) {
        self.direction = direction.normalize_or_zero();
        self.direction_forced = forced;
    }

    pub fn is_direction_forced(&self) -> bool {
        self.direction_forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_press_release() {
        let mut pilot = Pilot::new();
        assert!(!pilot.is_action_pressed(ActionMask::JUMP));

        pilot.press_action(ActionMask::JUMP);
        assert!(pilot.is_action_pressed(ActionMask::JUMP));
        assert!(pilot.is_action_pressed(ActionMask::JUMP | ActionMask::ATTACK));

        pilot.release_action(ActionMask::JUMP);
        assert!(!pilot.is_action_pressed(ActionMask::JUMP));
    }

    #[test]
    fn test_set_direction_normalizes() {
        let mut pilot = Pilot::new();
        pilot.set_direction(Vec3::new(3.0, 0.0, 0.0), true);
        assert!((pilot.direction.length() - 1.0).abs() < 1e-6);
        assert!(pilot.is_direction_forced());
    }

    #[test]
    fn test_set_direction_zero_stays_zero() {
        let mut pilot = Pilot::new();
        pilot.set_direction(Vec3::ZERO, false);
        assert_eq!(pilot.direction, Vec3::ZERO);
    }
}
