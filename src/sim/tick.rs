//! Per-frame simulation step
//!
//! Order within a frame: look + jump, player integration, surface resolution
//! (platforms in parkour, floor and walls otherwise), aim/fire, target motion,
//! then the round clock. Reaching the goal ends the frame immediately.

use glam::Vec2;

use super::aim::{Raycaster, first_surface, resolve_aim};
use super::player::MoveInput;
use super::state::{GameEvent, GameMode, GameState};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: MoveInput,
    /// Look delta (yaw, pitch) in radians, already scaled by sensitivity
    pub look: Vec2,
    /// Fire pressed this frame
    pub fire: bool,
    /// Jump pressed this frame
    pub jump: bool,
}

/// Advance the session by `dt` seconds. Does nothing unless playing.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, scene: &dyn Raycaster) {
    if !state.is_playing() {
        return;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    state.frames += 1;

    // --- PLAYER ---
    let tuning = state.tuning.player.clone();
    state.player.look(input.look.x, input.look.y);
    if input.jump {
        state.player.jump(&tuning);
    }
    state.player.integrate(dt, &input.movement, &tuning);

    match state.mode {
        GameMode::Parkour => {
            let landing = state.player.land_on_platforms(state.level.platforms(), &tuning);
            match landing {
                Some(landing) if landing.is_goal => {
                    // The winning frame counts towards the completion time
                    state.elapsed += dt;
                    state.win_parkour();
                    return;
                }
                Some(_) => {}
                None if state.player.fell_out(&tuning) => state.respawn_player(),
                None => {}
            }
        }
        GameMode::Static | GameMode::Tracking => state.player.resolve_arena(&tuning),
    }

    // --- AIM ---
    match state.mode {
        GameMode::Static if input.fire => fire(state, scene),
        // Tracking scores by overlap only, so fire is not counted as a shot
        GameMode::Tracking => track(state, scene, dt),
        _ => {}
    }

    // --- TARGETS ---
    let mode = state.mode;
    let moved = state.targets.update(dt, mode, state.rng.as_mut());
    for id in moved {
        if let Some(position) = state.targets.get(id).map(|t| t.position) {
            state.emit(GameEvent::TargetMoved { id, position });
        }
    }

    // --- CLOCK ---
    state.elapsed += dt;
    if mode.is_timed() {
        state.time_left -= dt;
        if state.time_left <= 0.0 {
            state.emit(GameEvent::TimeChanged { seconds: 0.0 });
            state.time_up();
        } else {
            let seconds = state.time_left;
            state.emit(GameEvent::TimeChanged { seconds });
        }
    } else {
        let seconds = state.elapsed;
        state.emit(GameEvent::TimeChanged { seconds });
    }
}

/// Discrete shot (static mode)
fn fire(state: &mut GameState, scene: &dyn Raycaster) {
    state.shots_fired += 1;
    state.emit(GameEvent::Shot);

    let ray = state.player.aim_ray();
    let hits = scene.cast(&ray);

    match resolve_aim(&hits, &state.targets) {
        Some((id, distance)) => {
            state.targets.hit(id);
            state.shots_hit += 1;
            state.emit(GameEvent::Hit {
                id,
                point: ray.at(distance),
            });
            state.emit(GameEvent::TargetDespawned { id });
            let points = state.tuning.session.points_per_hit;
            state.add_score(points);
            state.spawn_target(None);
        }
        None => {
            let point = first_surface(&hits).map(|hit| ray.at(hit.distance));
            state.emit(GameEvent::Miss { point });
        }
    }
}

/// Continuous scoring while the aim ray overlaps the target (tracking mode)
fn track(state: &mut GameState, scene: &dyn Raycaster, dt: f32) {
    let ray = state.player.aim_ray();
    let hits = scene.cast(&ray);
    let on_target = resolve_aim(&hits, &state.targets).is_some();

    if on_target {
        state.time_on_target += dt;
        let points = state.tuning.session.tracking_points_per_sec * dt as f64;
        state.add_score(points);
    }
    if on_target != state.on_target {
        state.on_target = on_target;
        state.emit(GameEvent::TrackingChanged { on_target });
    }
}
