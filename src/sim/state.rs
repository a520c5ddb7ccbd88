//! Session state and transitions
//!
//! `GameState` is the only owner of simulation data: the player, the target
//! pool and the parkour level. Transitions that don't apply to the current
//! phase are no-ops and return `false`. Everything the presentation layer
//! needs to know is queued as a `GameEvent`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::random_unit_vector;
use super::level::{Level, Platform};
use super::player::PlayerState;
use super::rng::{RandomSource, SeededRandom};
use super::target::{TargetId, TargetPool};
use crate::settings::Tuning;

/// Game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Stationary targets, discrete hits
    #[default]
    Static,
    /// One moving target, score while on it
    Tracking,
    /// Climb to the goal platform
    Parkour,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Static => "static",
            GameMode::Tracking => "tracking",
            GameMode::Parkour => "parkour",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "static" => Some(GameMode::Static),
            "tracking" | "track" => Some(GameMode::Tracking),
            "parkour" => Some(GameMode::Parkour),
            _ => None,
        }
    }

    /// Whether the mode runs on a countdown
    pub fn is_timed(&self) -> bool {
        !matches!(self, GameMode::Parkour)
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu, nothing running
    #[default]
    Idle,
    Playing,
    Paused,
    /// Round over (see `GameState::outcome`)
    GameOver,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    TimeUp,
    GoalReached,
}

/// Round summary handed to game-over and win notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub mode: GameMode,
    pub score: f64,
    pub shots_fired: u32,
    pub shots_hit: u32,
    /// Hits / shots in static mode, time on target / elapsed in tracking
    pub accuracy: f32,
    pub time_on_target: f32,
    pub elapsed: f32,
    /// Parkour completion time
    pub completion_time: Option<f32>,
    pub outcome: Option<Outcome>,
}

/// Session-level tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub round_seconds: f32,
    pub static_target_count: usize,
    pub points_per_hit: f64,
    pub tracking_points_per_sec: f64,
}

impl Default for SessionTuning {
    fn default() -> Self {
        use crate::consts::*;
        Self {
            round_seconds: ROUND_SECONDS,
            static_target_count: STATIC_TARGET_COUNT,
            points_per_hit: POINTS_PER_HIT,
            tracking_points_per_sec: TRACKING_POINTS_PER_SEC,
        }
    }
}

/// Notifications for the presentation layer, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started { mode: GameMode },
    Paused,
    Resumed,
    Quit,
    TargetSpawned { id: TargetId, position: Vec3 },
    TargetMoved { id: TargetId, position: Vec3 },
    TargetDespawned { id: TargetId },
    LevelBuilt { platforms: Vec<Platform> },
    LevelCleared { count: usize },
    /// Fire action in static mode
    Shot,
    Hit { id: TargetId, point: Vec3 },
    /// `point` is where the ray met scenery, if it met any
    Miss { point: Option<Vec3> },
    /// Tracking aim moved onto / off the target
    TrackingChanged { on_target: bool },
    ScoreChanged { score: f64 },
    TimeChanged { seconds: f32 },
    PlayerRespawned { position: Vec3 },
    GameOver { stats: SessionStats },
    Win { stats: SessionStats },
}

/// Complete simulation state of one session
pub struct GameState {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub outcome: Option<Outcome>,
    pub score: f64,
    pub shots_fired: u32,
    pub shots_hit: u32,
    /// Countdown for timed modes
    pub time_left: f32,
    /// Seconds of play since start (pauses excluded)
    pub elapsed: f32,
    pub time_on_target: f32,
    pub on_target: bool,
    pub completion_time: Option<f32>,
    /// Simulated frames since start
    pub frames: u64,
    pub player: PlayerState,
    pub targets: TargetPool,
    pub level: Level,
    pub tuning: Tuning,
    pub(crate) rng: Box<dyn RandomSource>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// New idle session with default tuning and a seeded RNG
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Tuning::default(), Box::new(SeededRandom::new(seed)))
    }

    /// New idle session with explicit tuning and random source
    pub fn with_rng(tuning: Tuning, rng: Box<dyn RandomSource>) -> Self {
        let eye = tuning.player.eye_height;
        Self {
            mode: GameMode::default(),
            phase: GamePhase::Idle,
            outcome: None,
            score: 0.0,
            shots_fired: 0,
            shots_hit: 0,
            time_left: 0.0,
            elapsed: 0.0,
            time_on_target: 0.0,
            on_target: false,
            completion_time: None,
            frames: 0,
            player: PlayerState::new(Vec3::new(0.0, eye, 0.0)),
            targets: TargetPool::new(tuning.targets.clone()),
            level: Level::default(),
            tuning,
            rng,
            events: Vec::new(),
        }
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Start (or restart) a round in `mode`. Not allowed mid-round.
    pub fn start(&mut self, mode: GameMode) -> bool {
        if self.phase == GamePhase::Playing {
            return false;
        }

        self.discard_round();

        self.mode = mode;
        self.outcome = None;
        self.score = 0.0;
        self.shots_fired = 0;
        self.shots_hit = 0;
        self.elapsed = 0.0;
        self.time_on_target = 0.0;
        self.on_target = false;
        self.completion_time = None;
        self.frames = 0;
        self.time_left = if mode.is_timed() {
            self.tuning.session.round_seconds
        } else {
            0.0
        };

        match mode {
            GameMode::Static => {
                self.reset_player_to_arena();
                for _ in 0..self.tuning.session.static_target_count {
                    self.spawn_target(None);
                }
            }
            GameMode::Tracking => {
                self.reset_player_to_arena();
                let heading = random_unit_vector(self.rng.as_mut());
                self.spawn_target(Some(heading));
            }
            GameMode::Parkour => {
                self.level = Level::generate(&self.tuning.level, self.rng.as_mut());
                let spawn = self.level.spawn_point();
                self.player.reset(spawn);
                let platforms = self.level.platforms().to_vec();
                self.emit(GameEvent::LevelBuilt { platforms });
            }
        }

        self.phase = GamePhase::Playing;
        log::info!("Started {} round", mode.as_str());
        self.emit(GameEvent::Started { mode });
        self.emit(GameEvent::ScoreChanged { score: 0.0 });
        let clock = if mode.is_timed() { self.time_left } else { 0.0 };
        self.emit(GameEvent::TimeChanged { seconds: clock });
        true
    }

    /// Re-run the current mode from game over or the pause menu
    pub fn retry(&mut self) -> bool {
        match self.phase {
            GamePhase::GameOver | GamePhase::Paused => self.start(self.mode),
            _ => false,
        }
    }

    /// Freeze the simulation (look lock lost)
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        self.phase = GamePhase::Paused;
        log::info!("Paused at {:.2}s", self.elapsed);
        self.emit(GameEvent::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.phase = GamePhase::Playing;
        log::info!("Resumed");
        self.emit(GameEvent::Resumed);
        true
    }

    /// Back to the menu from any non-idle phase
    pub fn quit(&mut self) -> bool {
        if self.phase == GamePhase::Idle {
            return false;
        }
        self.discard_round();
        self.phase = GamePhase::Idle;
        self.outcome = None;
        log::info!("Quit to menu");
        self.emit(GameEvent::Quit);
        true
    }

    /// Goal reached: stop the clock and record the completion time, which
    /// is also the round's score. Time spent paused is not counted.
    pub fn win_parkour(&mut self) -> bool {
        if self.mode != GameMode::Parkour || self.phase != GamePhase::Playing {
            return false;
        }
        self.completion_time = Some(self.elapsed);
        self.score = self.elapsed as f64;
        let score = self.score;
        self.emit(GameEvent::ScoreChanged { score });
        self.outcome = Some(Outcome::GoalReached);
        self.phase = GamePhase::GameOver;
        log::info!("Parkour complete in {:.2}s", self.elapsed);
        let stats = self.stats();
        self.emit(GameEvent::Win { stats });
        true
    }

    /// Countdown expired
    pub(crate) fn time_up(&mut self) {
        self.time_left = 0.0;
        self.outcome = Some(Outcome::TimeUp);
        self.phase = GamePhase::GameOver;
        log::info!(
            "Time up: score {:.0}, {}/{} hits",
            self.score,
            self.shots_hit,
            self.shots_fired
        );
        let stats = self.stats();
        self.emit(GameEvent::GameOver { stats });
    }

    /// Current round summary
    pub fn stats(&self) -> SessionStats {
        let accuracy = match self.mode {
            GameMode::Static if self.shots_fired > 0 => {
                self.shots_hit as f32 / self.shots_fired as f32
            }
            GameMode::Tracking if self.elapsed > 0.0 => {
                (self.time_on_target / self.elapsed).min(1.0)
            }
            _ => 0.0,
        };
        SessionStats {
            mode: self.mode,
            score: self.score,
            shots_fired: self.shots_fired,
            shots_hit: self.shots_hit,
            accuracy,
            time_on_target: self.time_on_target,
            elapsed: self.elapsed,
            completion_time: self.completion_time,
            outcome: self.outcome,
        }
    }

    /// Spawn a target at a sampled gameplay position
    pub(crate) fn spawn_target(&mut self, heading: Option<Vec3>) -> TargetId {
        let position = self.targets.tuning().sample_spawn(self.rng.as_mut());
        let id = self.targets.spawn(position, heading);
        self.emit(GameEvent::TargetSpawned { id, position });
        id
    }

    pub(crate) fn add_score(&mut self, points: f64) {
        if points <= 0.0 {
            return;
        }
        self.score += points;
        let score = self.score;
        self.emit(GameEvent::ScoreChanged { score });
    }

    /// Parkour fall recovery
    pub(crate) fn respawn_player(&mut self) {
        let spawn = self.level.spawn_point();
        self.player.reset(spawn);
        log::debug!("Player fell out, respawned at {:?}", spawn);
        self.emit(GameEvent::PlayerRespawned { position: spawn });
    }

    fn reset_player_to_arena(&mut self) {
        let eye = self.tuning.player.eye_height;
        self.player.reset(Vec3::new(0.0, eye, 0.0));
    }

    /// Hide all targets and drop the level
    fn discard_round(&mut self) {
        for id in self.targets.despawn_all() {
            self.emit(GameEvent::TargetDespawned { id });
        }
        if !self.level.is_empty() {
            let count = self.level.len();
            self.level.clear();
            self.emit(GameEvent::LevelCleared { count });
        }
    }
}
