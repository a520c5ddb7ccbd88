//! Gameplay simulation
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - Variable timestep, driven by the shell
//! - Randomness only through an injected `RandomSource`
//! - Raycasts answered by a `Raycaster` collaborator
//! - Output is a queue of `GameEvent`s

pub mod aim;
pub mod geometry;
pub mod level;
pub mod player;
pub mod rng;
pub mod state;
pub mod target;
pub mod tick;

pub use aim::{EntityRef, NoHits, RayHit, Raycaster, first_surface, resolve_aim};
pub use geometry::Ray;
pub use level::{Level, LevelConfig, Platform};
pub use player::{Landing, MoveInput, PlayerState, PlayerTuning};
pub use rng::{RandomSource, ScriptedRandom, SeededRandom};
pub use state::{
    GameEvent, GameMode, GamePhase, GameState, Outcome, SessionStats, SessionTuning,
};
pub use target::{Target, TargetId, TargetPool, TargetTuning};
pub use tick::{TickInput, tick};
