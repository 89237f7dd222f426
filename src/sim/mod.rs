//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit timestep arguments only
//! - Seeded RNG only
//! - No I/O or platform dependencies; side effects surface as `RoundEvent`s

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{ArcSegment, CollisionSubject, circle_arc_overlap, circle_circle_overlap};
pub use state::{
    EffectKind, Hazard, HazardSpec, LaneSet, LaneTransition, Player, RoundConfig, RoundEvent,
    RoundPhase, RoundState, Token,
};
pub use tick::{FrameInput, frame, on_collision, physics_tick};
