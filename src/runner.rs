//! Effectful shell around the pure simulation
//!
//! Owns the round state plus the collaborator context (storage, sound
//! trigger, leaderboard, scene router), runs the fixed-timestep physics
//! accumulator and dispatches drained `RoundEvent`s to the collaborators.

use anyhow::Result;

use crate::audio::SoundTrigger;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::hud::HudModel;
use crate::platform::{
    HIGH_SCORE_KEY, LOGGED_OUT_KEY, LeaderboardSink, LogLeaderboard, LogSceneRouter, MemoryStorage,
    SceneRouter, Storage,
};
use crate::sim::{FrameInput, RoundConfig, RoundEvent, RoundState, frame, physics_tick};

/// Shared collaborator context, constructed once and passed in explicitly
pub struct Services {
    pub storage: Box<dyn Storage>,
    pub sounds: SoundTrigger,
    pub leaderboard: Box<dyn LeaderboardSink>,
    pub scene: Box<dyn SceneRouter>,
}

impl Services {
    /// In-memory, silent context for tests and headless runs
    pub fn headless() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            sounds: SoundTrigger::disabled(),
            leaderboard: Box::new(LogLeaderboard),
            scene: Box::new(LogSceneRouter),
        }
    }
}

/// Drives the round: one `on_frame` call per display refresh
pub struct Runner {
    pub state: RoundState,
    services: Services,
    accumulator: f32,
}

impl Runner {
    /// Build the runner, loading the persisted high score
    pub fn new(config: RoundConfig, seed: u64, services: Services) -> Result<Self> {
        let mut state = RoundState::new(config, seed)?;

        let saved = services.storage.get_i64(HIGH_SCORE_KEY).unwrap_or(0);
        state.high_score = saved.max(0) as u32;
        log::info!("loaded high score: {}", state.high_score);

        // Owned by the auth collaborator; observed here, never written
        if services.storage.get_i64(LOGGED_OUT_KEY).unwrap_or(0) != 0 {
            log::info!("user is logged out");
        }

        Ok(Self {
            state,
            services,
            accumulator: 0.0,
        })
    }

    /// Advance one display frame: variable-timestep logic, then as many fixed
    /// physics substeps as the accumulated time covers (capped), then event
    /// dispatch.
    pub fn on_frame(&mut self, input: &FrameInput, dt: f32) {
        let dt = dt.min(0.1);
        frame(&mut self.state, input, dt);

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            physics_tick(&mut self.state, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in self.state.drain_events() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: RoundEvent) {
        match event {
            RoundEvent::Sound(cue) => self.services.sounds.play(cue),
            RoundEvent::Effect { kind, pos } => {
                // Transient visuals are rendered by the front end; absent one,
                // the effect is simply skipped
                log::debug!("effect {:?} at ({:.2}, {:.2})", kind, pos.x, pos.y);
            }
            RoundEvent::RoundEnded {
                high_score,
                new_best,
                ..
            } => {
                if new_best {
                    self.services.storage.set_i64(HIGH_SCORE_KEY, high_score as i64);
                }
                // Fire-and-forget: submission failure never touches round state
                self.services.leaderboard.submit(high_score);
            }
            RoundEvent::RoundStarted
            | RoundEvent::TokenSpawned { .. }
            | RoundEvent::TokenCollected { .. } => {}
        }
    }

    /// Current display snapshot
    pub fn hud(&self) -> HudModel {
        HudModel::from_state(&self.state)
    }

    /// Exit point after round end; fire-and-forget
    pub fn return_to_menu(&mut self) {
        self.services.scene.return_to_menu();
    }
}
