//! Shared signal bus - named boolean conditions raised by many subsystems
//!
//! Combat, fire, AI perception and the motion core itself all communicate
//! through this bus. Motion only ever reads/writes through the typed mask,
//! never a raw integer.

use bitflags::bitflags;

bitflags! {
    /// One bit per named condition. Masks can be combined for any-of queries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SignalMask: u16 {
        /// Entity lost ground support and is falling.
        const FALL_DOWN      = 1 << 0;
        /// Entity is panicking (fire, scary dragon nearby).
        const PANIC          = 1 << 1;
        /// Something is biting this entity.
        const BITING         = 1 << 2;
        /// Entity latched onto its target.
        const LATCHING       = 1 << 3;
        /// Entity locked inside a cage.
        const LOCKED_IN_CAGE = 1 << 4;
        /// Entity is infatuated and faces the player.
        const IN_LOVE        = 1 << 5;
        /// A fire is touching this entity.
        const BURNING        = 1 << 6;
        /// Entity is submerged.
        const IN_WATER       = 1 << 7;
        /// Melee attack animation set is available.
        const MELEE          = 1 << 8;
        /// Ranged attack animation set is available.
        const RANGED         = 1 << 9;
    }
}

impl SignalMask {
    /// Signals that suspend free movement when raised.
    pub const BLOCKS_FREE_MOVEMENT: SignalMask = SignalMask::FALL_DOWN
        .union(SignalMask::PANIC)
        .union(SignalMask::BITING)
        .union(SignalMask::LATCHING)
        .union(SignalMask::LOCKED_IN_CAGE)
        .union(SignalMask::IN_LOVE);
}

/// Per-entity signal storage with typed access.
#[derive(Debug, Clone)]
pub struct SignalBus {
    raised: SignalMask,
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalBus {
    pub fn new() -> Self {
        Self {
            raised: SignalMask::empty(),
        }
    }

    /// True if any signal in `mask` is raised.
    pub fn get(&self, mask: SignalMask) -> bool {
        self.raised.intersects(mask)
    }

    /// Raise or clear every signal in `mask`.
    pub fn set(&mut self, mask: SignalMask, value: bool) {
        let before = self.raised;
        self.raised.set(mask, value);
        if self.raised != before {
            log::trace!("signal {:?} -> {}", mask, value);
        }
    }

    /// Drop every raised signal (entity respawn/reset).
    pub fn clear(&mut self) {
        self.raised = SignalMask::empty();
    }

    pub fn raised(&self) -> SignalMask {
        self.raised
    }
}
