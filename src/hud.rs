//! One-way display outputs
//!
//! The core pushes these values to whatever front end renders them; nothing
//! is ever read back. Absent display targets are the renderer's concern - a
//! missing label simply goes unpainted.

use crate::sim::{RoundPhase, RoundState};

/// Snapshot of everything the gameplay screen displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudModel {
    /// Current score, plain text
    pub score_text: String,
    /// Best score, formatted label
    pub best_text: String,
    /// "Tap to play" prompt visibility
    pub tap_to_play_visible: bool,
    /// Round-ended panel visibility
    pub ended_visible: bool,
}

impl HudModel {
    /// Build the HUD snapshot for the current round state
    pub fn from_state(state: &RoundState) -> Self {
        Self {
            score_text: state.score.to_string(),
            best_text: format!("Best: {}", state.high_score),
            tap_to_play_visible: state.phase == RoundPhase::Idle,
            ended_visible: state.phase == RoundPhase::Ended,
        }
    }
}
