//! Creature locomotion state machine for 2.5D side-scrolling worlds
//!
//! This crate implements:
//! - A per-entity motion state machine (free, biting, latching, caged,
//!   panic, free fall, stand up, infatuated) driven by a shared signal bus
//! - Five locomotion strategies behind one hook set: ground walking with
//!   jumping, aerial flight with banking, rail-constrained travel,
//!   wall/ceiling walking, underwater swimming
//! - The physics tick: steering integration, gravity and terminal
//!   velocity, orientation blending, raycast surface sensing
//!
//! The host simulation loop drives the three tick phases in a fixed order
//! and supplies the collaborators (pilot intent, signal bus, view proxy,
//! surface probe) through [`controller::TickEnv`].

pub mod body;
pub mod config;
pub mod controller;
pub mod error;
pub mod math;
pub mod pilot;
pub mod rail;
pub mod signals;
pub mod strategy;
pub mod surface;
pub mod view;

// Re-export main types for convenience
pub use body::RigidBody;
pub use config::{
    AirParams, GroundParams, MotionParams, MotionPreset, UpAxis, WagonParams, WallWalkingParams,
    WaterParams,
};
pub use controller::{Anchors, MotionController, MotionCore, MotionState, TickEnv};
pub use error::MotionError;
pub use pilot::{ActionMask, Pilot};
pub use rail::{RailSample, RailTrack};
pub use signals::{SignalBus, SignalMask};
pub use strategy::{Air, Ground, Locomotion, Wagon, WallWalking, Water};
pub use surface::{ContactPoint, NoSurface, PlaneProbe, SurfaceHit, SurfaceProbe};
pub use view::{NullView, ViewEvent, ViewLog, ViewProxy};
