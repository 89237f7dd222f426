//! Orbit Runner - a single-lane-switching orbital arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (round state machine, motion, collisions)
//! - `audio`: One-shot sound cue triggering
//! - `platform`: Storage / leaderboard / scene collaborator seams
//! - `hud`: One-way display outputs
//! - `runner`: Effectful shell driving the sim and its collaborators

pub mod audio;
pub mod hud;
pub mod platform;
pub mod runner;
pub mod sim;

pub use runner::{Runner, Services};
pub use sim::{FrameInput, RoundConfig, RoundPhase, RoundState};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth motion)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum physics substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default lane offsets (signed, distance from center is the magnitude)
    pub const DEFAULT_LANES: [f32; 3] = [-2.45, -1.75, -1.05];

    /// Player tangential speed along its lane (units/sec)
    pub const PLAYER_LINEAR_SPEED: f32 = 5.0;
    /// Lane-change interpolation duration (seconds)
    pub const LANE_CHANGE_DURATION: f32 = 0.3;
    /// Player collision circle radius
    pub const PLAYER_RADIUS: f32 = 0.15;

    /// Seconds between passive score awards
    pub const SCORE_INTERVAL: f32 = 1.0;
    /// Points per passive score award
    pub const SCORE_PER_INTERVAL: u32 = 1;
    /// Points per collected token
    pub const TOKEN_BONUS: u32 = 10;

    /// Seconds between token spawn attempts
    pub const SPAWN_INTERVAL: f32 = 2.0;
    /// Maximum simultaneously live tokens
    pub const MAX_TOKENS: u32 = 2;
    /// Token pickup circle radius
    pub const TOKEN_RADIUS: f32 = 0.12;

    /// Radial thickness of hazard arcs
    pub const HAZARD_THICKNESS: f32 = 0.25;

    /// Token spawn angles are quantized to this step (radians, 10 degrees)
    pub const TOKEN_ANGLE_STEP: f32 = 10.0 * std::f32::consts::PI / 180.0;
    /// Number of quantized token spawn angles; 36 steps of 10 degrees cover
    /// the full turn exactly once (a 37th would alias the zero angle)
    pub const TOKEN_ANGLE_STEPS: u32 = 36;
}

/// Normalize angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
