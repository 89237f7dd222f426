//! Round state and core simulation types
//!
//! Everything the round state machine owns lives here: lane configuration,
//! the player's motion state, hazards, tokens and the scoring counters.

use anyhow::{Result, bail};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::ArcSegment;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{normalize_angle, polar_to_cartesian};

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for the start input ("tap to play")
    Idle,
    /// Gameplay running
    Active,
    /// Fatal collision happened, awaiting restart
    Ended,
}

/// The ordered set of lane offsets the player can occupy
///
/// Offsets are kept signed as configured; the lane radius is the magnitude.
/// Indexing is cyclic.
#[derive(Debug, Clone)]
pub struct LaneSet {
    lanes: Vec<f32>,
}

impl LaneSet {
    /// Build a lane set, failing fast on invalid configuration
    pub fn new(lanes: Vec<f32>) -> Result<Self> {
        if lanes.is_empty() {
            bail!("lane set must contain at least one lane");
        }
        if lanes.iter().any(|l| *l == 0.0 || !l.is_finite()) {
            bail!("lane offsets must be finite and non-zero");
        }
        Ok(Self { lanes })
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty() // always false: construction rejects empty sets
    }

    /// Radius of the given lane (magnitude of the stored offset)
    pub fn radius(&self, index: usize) -> f32 {
        self.lanes[index % self.lanes.len()].abs()
    }

    /// Next lane index, wrapping modulo the lane count
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.lanes.len()
    }

    pub fn min_radius(&self) -> f32 {
        self.lanes.iter().map(|l| l.abs()).fold(f32::MAX, f32::min)
    }

    pub fn max_radius(&self) -> f32 {
        self.lanes.iter().map(|l| l.abs()).fold(0.0, f32::max)
    }
}

/// Placement and motion of one hazard arc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardSpec {
    /// Lane index the arc sits on
    pub lane: usize,
    /// Angular span of the arc (radians)
    pub span: f32,
    /// Orientation at round start (radians)
    pub initial_angle: f32,
    /// Signed rotation speed (radians/sec)
    pub angular_speed: f32,
}

/// Round tuning, loadable from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Signed lane offsets; magnitude is the orbit radius
    pub lanes: Vec<f32>,
    /// Player tangential speed (units/sec), constant across lanes
    pub linear_speed: f32,
    /// Lane-change interpolation duration (seconds)
    pub lane_change_duration: f32,
    /// Player collision circle radius
    pub player_radius: f32,
    /// Seconds between passive score awards
    pub score_interval: f32,
    /// Points per passive award
    pub score_per_interval: u32,
    /// Points per collected token
    pub token_bonus: u32,
    /// Seconds between token spawn attempts
    pub spawn_interval: f32,
    /// Cap on simultaneously live tokens
    pub max_tokens: u32,
    /// Token pickup circle radius
    pub token_radius: f32,
    /// Skip the tap-to-play screen after a restart
    pub auto_start_on_restart: bool,
    /// Hazard arc layout
    pub hazards: Vec<HazardSpec>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES.to_vec(),
            linear_speed: PLAYER_LINEAR_SPEED,
            lane_change_duration: LANE_CHANGE_DURATION,
            player_radius: PLAYER_RADIUS,
            score_interval: SCORE_INTERVAL,
            score_per_interval: SCORE_PER_INTERVAL,
            token_bonus: TOKEN_BONUS,
            spawn_interval: SPAWN_INTERVAL,
            max_tokens: MAX_TOKENS,
            token_radius: TOKEN_RADIUS,
            auto_start_on_restart: false,
            hazards: default_hazards(),
        }
    }
}

impl RoundConfig {
    /// Validate tuning values, failing fast on configuration errors
    pub fn validate(&self) -> Result<()> {
        if self.linear_speed <= 0.0 {
            bail!("linear_speed must be positive");
        }
        if self.lane_change_duration <= 0.0 {
            bail!("lane_change_duration must be positive");
        }
        if self.score_interval <= 0.0 || self.spawn_interval <= 0.0 {
            bail!("score and spawn intervals must be positive");
        }
        for spec in &self.hazards {
            if spec.lane >= self.lanes.len() {
                bail!("hazard lane {} out of range", spec.lane);
            }
        }
        Ok(())
    }
}

/// Default arena: one arc per lane, alternating spin, each with a passable gap
///
/// The lane-0 arc starts opposite the player spawn so a fresh round never
/// begins inside a hazard.
fn default_hazards() -> Vec<HazardSpec> {
    use std::f32::consts::PI;
    vec![
        HazardSpec {
            lane: 0,
            span: 0.8 * PI,
            initial_angle: PI,
            angular_speed: 0.9,
        },
        HazardSpec {
            lane: 1,
            span: 1.0 * PI,
            initial_angle: -PI / 2.0,
            angular_speed: -1.1,
        },
        HazardSpec {
            lane: 2,
            span: 1.1 * PI,
            initial_angle: 0.0,
            angular_speed: 1.4,
        },
    ]
}

/// In-flight lane change, resumed each frame until `elapsed >= duration`
#[derive(Debug, Clone, Copy)]
pub struct LaneTransition {
    pub start_radius: f32,
    pub end_radius: f32,
    pub target_lane: usize,
    pub elapsed: f32,
    pub duration: f32,
}

/// The player token: lane state, radial position and orbital angle
#[derive(Debug, Clone)]
pub struct Player {
    pub lane_index: usize,
    pub current_radius: f32,
    /// Orbital angle (radians, world frame)
    pub theta: f32,
    initial_theta: f32,
    pub alive: bool,
    pub input_enabled: bool,
    pub transition: Option<LaneTransition>,
}

impl Player {
    pub fn new(lane0_radius: f32) -> Self {
        let initial_theta = std::f32::consts::FRAC_PI_2; // start at the top
        Self {
            lane_index: 0,
            current_radius: lane0_radius,
            theta: initial_theta,
            initial_theta,
            alive: true,
            input_enabled: false,
            transition: None,
        }
    }

    /// Cartesian position of the player
    pub fn pos(&self) -> Vec2 {
        polar_to_cartesian(self.current_radius, self.theta)
    }

    /// Cancel any in-flight lane change and return to the initial lane/orientation
    ///
    /// Input stays disabled until the next active frame re-arms it.
    pub fn reset(&mut self, lane0_radius: f32) {
        self.transition = None;
        self.lane_index = 0;
        self.current_radius = lane0_radius;
        self.theta = self.initial_theta;
        self.input_enabled = false;
        self.alive = true;
    }

    /// Begin a lane change toward `target_lane`
    ///
    /// An in-flight transition is dropped outright; the newest request wins.
    /// The lane index only commits on completion, so a cancelled change never
    /// partially applies.
    pub fn begin_lane_change(&mut self, target_lane: usize, target_radius: f32, duration: f32) {
        self.transition = Some(LaneTransition {
            start_radius: self.current_radius,
            end_radius: target_radius,
            target_lane,
            elapsed: 0.0,
            duration,
        });
        self.input_enabled = false;
    }

    /// Advance the in-flight lane change by frame time, committing on completion
    pub fn advance_transition(&mut self, dt: f32) {
        let Some(mut t) = self.transition else {
            return;
        };
        t.elapsed += dt;
        let frac = (t.elapsed / t.duration).clamp(0.0, 1.0);
        self.current_radius = t.start_radius + (t.end_radius - t.start_radius) * frac;

        if t.elapsed >= t.duration {
            self.lane_index = t.target_lane;
            self.current_radius = t.end_radius;
            self.input_enabled = true;
            self.transition = None;
        } else {
            self.transition = Some(t);
        }
    }

    /// Advance the orbital angle by one physics tick
    ///
    /// Angular speed is linear_speed / radius so the tangential speed stays
    /// constant across lanes. A zero radius cannot occur with a valid lane
    /// set; the guard keeps the angle finite regardless.
    pub fn orbit(&mut self, linear_speed: f32, fixed_dt: f32) {
        let angular_speed = if self.current_radius > 0.0 {
            linear_speed / self.current_radius
        } else {
            0.0
        };
        self.theta = normalize_angle(self.theta + angular_speed * fixed_dt);
    }
}

/// A rotating obstacle arc on a fixed lane
#[derive(Debug, Clone)]
pub struct Hazard {
    /// Arc geometry at orientation zero
    arc: ArcSegment,
    pub orientation: f32,
    initial_orientation: f32,
    pub angular_speed: f32,
}

impl Hazard {
    pub fn from_spec(spec: &HazardSpec, lanes: &LaneSet) -> Self {
        let radius = lanes.radius(spec.lane);
        let arc = ArcSegment::new(radius, HAZARD_THICKNESS, -spec.span / 2.0, spec.span / 2.0);
        Self {
            arc,
            orientation: spec.initial_angle,
            initial_orientation: spec.initial_angle,
            angular_speed: spec.angular_speed,
        }
    }

    /// Rotate by one physics tick; the caller gates this on the round being active
    pub fn rotate(&mut self, fixed_dt: f32) {
        self.orientation = normalize_angle(self.orientation + self.angular_speed * fixed_dt);
    }

    /// Restore the orientation captured at initialization
    pub fn reset(&mut self) {
        self.orientation = self.initial_orientation;
    }

    /// Arc geometry at the current orientation
    pub fn world_arc(&self) -> ArcSegment {
        self.arc.rotated(self.orientation)
    }
}

/// A collectible token sitting on a random lane
#[derive(Debug, Clone)]
pub struct Token {
    pub id: u32,
    pub lane_index: usize,
    /// Spawn angle (cosmetic, quantized to 10-degree steps)
    pub theta: f32,
}

impl Token {
    pub fn pos(&self, lanes: &LaneSet) -> Vec2 {
        polar_to_cartesian(lanes.radius(self.lane_index), self.theta)
    }
}

/// Transient visual effect kinds surfaced to the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Player death burst
    Explosion,
    /// Token pickup sparkle
    Sparkle,
}

/// One-way outputs of a tick, drained by the shell
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    Sound(SoundCue),
    Effect { kind: EffectKind, pos: Vec2 },
    RoundStarted,
    RoundEnded {
        score: u32,
        high_score: u32,
        new_best: bool,
    },
    TokenSpawned { lane: usize },
    TokenCollected { id: u32 },
}

/// Complete round state
///
/// Single writer of phase, score and the spawn budget. Deterministic for a
/// given seed and input sequence.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub score: u32,
    /// Best score seen; persisted by the shell when a round ends with a new maximum
    pub high_score: u32,
    pub(crate) score_timer: f32,
    pub(crate) spawn_timer: f32,
    pub active_tokens: u32,
    pub lanes: LaneSet,
    pub config: RoundConfig,
    pub player: Player,
    pub hazards: Vec<Hazard>,
    pub tokens: Vec<Token>,
    /// Physics tick counter
    pub time_ticks: u64,
    events: Vec<RoundEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl RoundState {
    /// Build a round from config, failing fast on invalid configuration
    pub fn new(config: RoundConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let lanes = LaneSet::new(config.lanes.clone())?;
        let hazards = config
            .hazards
            .iter()
            .map(|spec| Hazard::from_spec(spec, &lanes))
            .collect();
        let player = Player::new(lanes.radius(0));

        Ok(Self {
            phase: RoundPhase::Idle,
            score: 0,
            high_score: 0,
            score_timer: 0.0,
            spawn_timer: 0.0,
            active_tokens: 0,
            lanes,
            config,
            player,
            hazards,
            tokens: Vec::new(),
            time_ticks: 0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        })
    }

    pub(crate) fn push_event(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Idle -> Active. No-op in any other phase.
    pub fn start_round(&mut self) {
        if self.phase != RoundPhase::Idle {
            return;
        }
        log::info!("starting round");
        self.reset_round_state();
        self.phase = RoundPhase::Active;
        self.push_event(RoundEvent::RoundStarted);
    }

    /// Award points. Ignored unless the round is active.
    pub fn add_score(&mut self, points: u32) {
        if self.phase != RoundPhase::Active {
            return;
        }
        self.score += points;
    }

    /// Active -> Ended on a fatal collision. Idempotent once ended.
    pub fn report_hazard_collision(&mut self) {
        if self.phase != RoundPhase::Active {
            return;
        }
        self.phase = RoundPhase::Ended;

        let new_best = self.score > self.high_score;
        if new_best {
            self.high_score = self.score;
        }
        log::info!(
            "round over: score {} (best {})",
            self.score,
            self.high_score
        );
        self.push_event(RoundEvent::RoundEnded {
            score: self.score,
            high_score: self.high_score,
            new_best,
        });
    }

    /// Token pickup: bonus points and spawn budget decrement, floored at zero
    pub fn report_token_collected(&mut self, id: u32) {
        if self.phase != RoundPhase::Active {
            return;
        }
        self.add_score(self.config.token_bonus);
        self.active_tokens = self.active_tokens.saturating_sub(1);
        self.tokens.retain(|t| t.id != id);
        self.push_event(RoundEvent::TokenCollected { id });
    }

    /// Full reset from Ended (or Idle). No-op while a round is active.
    pub fn restart_round(&mut self) {
        if self.phase == RoundPhase::Active {
            return;
        }
        log::info!("restarting round");
        self.reset_round_state();
        if self.config.auto_start_on_restart {
            self.phase = RoundPhase::Active;
            self.push_event(RoundEvent::RoundStarted);
        } else {
            self.phase = RoundPhase::Idle;
        }
    }

    /// Shared reset sequence for round start and restart
    fn reset_round_state(&mut self) {
        self.score = 0;
        self.score_timer = 0.0;
        self.spawn_timer = 0.0;
        self.active_tokens = 0;
        self.tokens.clear();
        let lane0 = self.lanes.radius(0);
        self.player.reset(lane0);
        for hazard in &mut self.hazards {
            hazard.reset();
        }
    }

    /// Spawn one token at a uniformly random lane with a quantized random angle
    pub(crate) fn spawn_token(&mut self) {
        let lane_index = self.rng.random_range(0..self.lanes.len());
        let step = self.rng.random_range(0..TOKEN_ANGLE_STEPS);
        let theta = normalize_angle(step as f32 * TOKEN_ANGLE_STEP);

        let id = self.next_id;
        self.next_id += 1;

        log::debug!("token {} spawned on lane {}", id, lane_index);
        self.tokens.push(Token {
            id,
            lane_index,
            theta,
        });
        self.active_tokens += 1;
        self.push_event(RoundEvent::TokenSpawned { lane: lane_index });
    }
}
