//! Presentation shell
//!
//! Owns the simulation state together with the collaborator handles: a scene
//! (render sink + raycaster) and a feedback sink (audio, HUD, menus). Input
//! arrives as discrete events, the simulation runs once per frame, and the
//! queued `GameEvent`s are translated into collaborator calls. Nothing is
//! ever read back from the collaborators except raycast results.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameMode, GameState, Platform, Raycaster, SeededRandom, SessionStats, TargetId,
    TickInput, tick,
};

/// Handle for a transient impact decal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecalId(pub u32);

/// Anything the shell asks the renderer to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderEntity {
    Target(TargetId),
    /// Index into the current level's platform list
    Platform(usize),
    Decal(DecalId),
}

/// Render collaborator. Calls are fire-and-forget.
pub trait RenderSink {
    /// First time a pooled target is shown
    fn add_target(&mut self, id: TargetId, position: Vec3);
    fn add_platform(&mut self, index: usize, platform: &Platform);
    /// `hit` distinguishes hit marks from miss marks
    fn add_decal(&mut self, id: DecalId, position: Vec3, hit: bool);
    fn move_target(&mut self, id: TargetId, position: Vec3);
    fn remove_entity(&mut self, entity: RenderEntity);
    fn set_visible(&mut self, entity: RenderEntity, visible: bool);
}

/// Audio/HUD/UI collaborator. Every hook defaults to doing nothing.
#[allow(unused_variables)]
pub trait Feedback {
    fn on_started(&mut self, mode: GameMode) {}
    fn on_shoot(&mut self) {}
    fn on_hit(&mut self, point: Vec3) {}
    fn on_miss(&mut self) {}
    fn on_tracking_changed(&mut self, on_target: bool) {}
    fn on_score_changed(&mut self, score: f64) {}
    fn on_time_changed(&mut self, seconds: f32) {}
    fn on_respawned(&mut self) {}
    fn on_game_over(&mut self, stats: &SessionStats) {}
    fn on_win(&mut self, stats: &SessionStats) {}
    fn on_paused(&mut self) {}
    /// The host should re-acquire the look lock here
    fn on_resumed(&mut self) {}
    fn on_quit(&mut self) {}
}

/// Feedback sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {}

/// Movement key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Back,
    Left,
    Right,
}

/// Discrete input from the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Fire,
    SetMoveFlag(MoveDirection, bool),
    SetSprint(bool),
    JumpRequested,
    /// Raw pointer motion in pixels
    Look { dx: f32, dy: f32 },
    /// Pointer lock released or window lost focus
    LookLockLost,
}

#[derive(Debug, Clone, Copy)]
struct Decal {
    id: DecalId,
    remaining: f32,
}

/// Simulation plus collaborators, driven once per frame by the host
pub struct Shell<S, F>
where
    S: RenderSink + Raycaster,
    F: Feedback,
{
    state: GameState,
    settings: Settings,
    scene: S,
    feedback: F,
    input: TickInput,
    shown_targets: HashSet<TargetId>,
    decals: Vec<Decal>,
    next_decal: u32,
}

impl<S, F> Shell<S, F>
where
    S: RenderSink + Raycaster,
    F: Feedback,
{
    /// New idle shell with a seeded session using the settings' tuning
    pub fn new(settings: Settings, seed: u64, scene: S, feedback: F) -> Self {
        let state = GameState::with_rng(
            settings.tuning.clone(),
            Box::new(SeededRandom::new(seed)),
        );
        Self::with_state(state, settings, scene, feedback)
    }

    pub fn with_state(state: GameState, settings: Settings, scene: S, feedback: F) -> Self {
        Self {
            state,
            settings,
            scene,
            feedback,
            input: TickInput::default(),
            shown_targets: HashSet::new(),
            decals: Vec::new(),
            next_decal: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Number of decals still on screen
    pub fn decal_count(&self) -> usize {
        self.decals.len()
    }

    // === Transitions ===

    pub fn start(&mut self, mode: GameMode) -> bool {
        let started = self.state.start(mode);
        if started {
            self.input = TickInput::default();
        }
        self.dispatch();
        started
    }

    pub fn retry(&mut self) -> bool {
        let retried = self.state.retry();
        if retried {
            self.input = TickInput::default();
        }
        self.dispatch();
        retried
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.state.pause();
        self.dispatch();
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.state.resume();
        self.dispatch();
        resumed
    }

    pub fn quit(&mut self) -> bool {
        let quit = self.state.quit();
        if quit {
            self.input = TickInput::default();
        }
        self.dispatch();
        quit
    }

    // === Input ===

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Fire => self.input.fire = true,
            InputEvent::JumpRequested => self.input.jump = true,
            InputEvent::SetSprint(on) => self.input.movement.sprint = on,
            InputEvent::SetMoveFlag(direction, held) => {
                let movement = &mut self.input.movement;
                match direction {
                    MoveDirection::Forward => movement.forward = held,
                    MoveDirection::Back => movement.back = held,
                    MoveDirection::Left => movement.left = held,
                    MoveDirection::Right => movement.right = held,
                }
            }
            InputEvent::Look { dx, dy } => {
                self.input.look += self.settings.look_delta(dx, dy);
            }
            InputEvent::LookLockLost => {
                self.pause();
            }
        }
    }

    // === Frame ===

    /// Run one frame of `dt` seconds of wall-clock time
    pub fn frame(&mut self, dt: f32) {
        let real_dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let sim_dt = real_dt.min(MAX_FRAME_DT);

        tick(&mut self.state, &self.input, sim_dt, &self.scene);

        // One-shot inputs never carry over, even when the tick was skipped
        self.input.fire = false;
        self.input.jump = false;
        self.input.look = Vec2::ZERO;

        self.dispatch();
        self.advance_decals(real_dt);
    }

    /// Translate queued simulation events into collaborator calls
    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Started { mode } => self.feedback.on_started(mode),
                GameEvent::Paused => self.feedback.on_paused(),
                GameEvent::Resumed => self.feedback.on_resumed(),
                GameEvent::Quit => self.feedback.on_quit(),
                GameEvent::TargetSpawned { id, position } => {
                    if self.shown_targets.insert(id) {
                        self.scene.add_target(id, position);
                    } else {
                        self.scene.move_target(id, position);
                    }
                    self.scene.set_visible(RenderEntity::Target(id), true);
                }
                GameEvent::TargetMoved { id, position } => self.scene.move_target(id, position),
                GameEvent::TargetDespawned { id } => {
                    self.scene.set_visible(RenderEntity::Target(id), false);
                }
                GameEvent::LevelBuilt { platforms } => {
                    for (index, platform) in platforms.iter().enumerate() {
                        self.scene.add_platform(index, platform);
                    }
                }
                GameEvent::LevelCleared { count } => {
                    for index in 0..count {
                        self.scene.remove_entity(RenderEntity::Platform(index));
                    }
                }
                GameEvent::Shot => self.feedback.on_shoot(),
                GameEvent::Hit { point, .. } => {
                    self.feedback.on_hit(point);
                    self.spawn_decal(point, true);
                }
                GameEvent::Miss { point } => {
                    self.feedback.on_miss();
                    if let Some(point) = point {
                        self.spawn_decal(point, false);
                    }
                }
                GameEvent::TrackingChanged { on_target } => {
                    self.feedback.on_tracking_changed(on_target);
                }
                GameEvent::ScoreChanged { score } => self.feedback.on_score_changed(score),
                GameEvent::TimeChanged { seconds } => self.feedback.on_time_changed(seconds),
                GameEvent::PlayerRespawned { .. } => self.feedback.on_respawned(),
                GameEvent::GameOver { stats } => self.feedback.on_game_over(&stats),
                GameEvent::Win { stats } => self.feedback.on_win(&stats),
            }
        }
    }

    fn spawn_decal(&mut self, position: Vec3, hit: bool) {
        if !self.settings.decals {
            return;
        }
        let id = DecalId(self.next_decal);
        self.next_decal = self.next_decal.wrapping_add(1);
        self.scene.add_decal(id, position, hit);
        self.decals.push(Decal {
            id,
            remaining: self.settings.decal_lifetime,
        });
    }

    /// Decals fade on wall-clock time, independent of the session phase
    fn advance_decals(&mut self, dt: f32) {
        let scene = &mut self.scene;
        self.decals.retain_mut(|decal| {
            decal.remaining -= dt;
            if decal.remaining <= 0.0 {
                scene.remove_entity(RenderEntity::Decal(decal.id));
                false
            } else {
                true
            }
        });
    }
}
