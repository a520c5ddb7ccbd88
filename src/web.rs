//! Browser facade
//!
//! Exposes a `WebSession` to JavaScript. The host page owns the 3D scene,
//! audio and DOM; it receives draw commands through a `render(op, payload)`
//! callback and notifications through a `notify(name, payload)` callback.
//! Raycasts are answered from a mirror of what was drawn.

use glam::Vec3;
use js_sys::Function;
use serde_json::json;
use wasm_bindgen::prelude::*;

use crate::scene::HeadlessScene;
use crate::settings::Settings;
use crate::shell::{DecalId, Feedback, InputEvent, MoveDirection, RenderEntity, RenderSink, Shell};
use crate::sim::{GameMode, Platform, Ray, RayHit, Raycaster, SessionStats, TargetId};

// JS binding for pointer lock
#[wasm_bindgen(inline_js = "
    export function request_pointer_lock() {
        const canvas = document.getElementById('canvas');
        if (canvas) {
            const result = canvas.requestPointerLock();
            if (result && result.then) {
                result.catch(e => console.error('Pointer lock failed:', e));
            }
        }
    }
")]
extern "C" {
    fn request_pointer_lock();
}

#[wasm_bindgen(start)]
pub fn wasm_init() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Aim Parkour core loaded");
}

fn to_js(value: serde_json::Value) -> JsValue {
    js_sys::JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn entity_json(entity: RenderEntity) -> serde_json::Value {
    match entity {
        RenderEntity::Target(id) => json!({ "kind": "target", "id": id.0 }),
        RenderEntity::Platform(index) => json!({ "kind": "platform", "id": index }),
        RenderEntity::Decal(id) => json!({ "kind": "decal", "id": id.0 }),
    }
}

/// Render sink forwarding to a JS callback, mirrored for raycasts
struct WebScene {
    mirror: HeadlessScene,
    render: Function,
}

impl WebScene {
    fn send(&self, op: &str, payload: serde_json::Value) {
        if let Err(e) = self
            .render
            .call2(&JsValue::NULL, &JsValue::from_str(op), &to_js(payload))
        {
            log::warn!("render callback failed for {}: {:?}", op, e);
        }
    }
}

impl RenderSink for WebScene {
    fn add_target(&mut self, id: TargetId, position: Vec3) {
        self.mirror.add_target(id, position);
        self.send("add_target", json!({ "id": id.0, "position": position.to_array() }));
    }

    fn add_platform(&mut self, index: usize, platform: &Platform) {
        self.mirror.add_platform(index, platform);
        self.send(
            "add_platform",
            json!({
                "id": index,
                "position": platform.position.to_array(),
                "footprint": platform.footprint.to_array(),
                "is_goal": platform.is_goal,
            }),
        );
    }

    fn add_decal(&mut self, id: DecalId, position: Vec3, hit: bool) {
        self.mirror.add_decal(id, position, hit);
        self.send(
            "add_decal",
            json!({ "id": id.0, "position": position.to_array(), "hit": hit }),
        );
    }

    fn move_target(&mut self, id: TargetId, position: Vec3) {
        self.mirror.move_target(id, position);
        self.send("move_target", json!({ "id": id.0, "position": position.to_array() }));
    }

    fn remove_entity(&mut self, entity: RenderEntity) {
        self.mirror.remove_entity(entity);
        self.send("remove", entity_json(entity));
    }

    fn set_visible(&mut self, entity: RenderEntity, visible: bool) {
        self.mirror.set_visible(entity, visible);
        let mut payload = entity_json(entity);
        payload["visible"] = json!(visible);
        self.send("set_visible", payload);
    }
}

impl Raycaster for WebScene {
    fn cast(&self, ray: &Ray) -> Vec<RayHit> {
        self.mirror.cast(ray)
    }
}

/// Audio/HUD notifications forwarded to a JS callback
struct WebFeedback {
    notify: Function,
}

impl WebFeedback {
    fn send(&self, name: &str, payload: serde_json::Value) {
        if let Err(e) = self
            .notify
            .call2(&JsValue::NULL, &JsValue::from_str(name), &to_js(payload))
        {
            log::warn!("notify callback failed for {}: {:?}", name, e);
        }
    }

    fn send_stats(&self, name: &str, stats: &SessionStats) {
        let payload = serde_json::to_value(stats).unwrap_or(serde_json::Value::Null);
        self.send(name, payload);
    }
}

impl Feedback for WebFeedback {
    fn on_started(&mut self, mode: GameMode) {
        self.send("started", json!(mode.as_str()));
    }

    fn on_shoot(&mut self) {
        self.send("shoot", serde_json::Value::Null);
    }

    fn on_hit(&mut self, point: Vec3) {
        self.send("hit", json!(point.to_array()));
    }

    fn on_miss(&mut self) {
        self.send("miss", serde_json::Value::Null);
    }

    fn on_tracking_changed(&mut self, on_target: bool) {
        self.send("tracking", json!(on_target));
    }

    fn on_score_changed(&mut self, score: f64) {
        self.send("score", json!(score));
    }

    fn on_time_changed(&mut self, seconds: f32) {
        self.send("time", json!(seconds));
    }

    fn on_respawned(&mut self) {
        self.send("respawned", serde_json::Value::Null);
    }

    fn on_game_over(&mut self, stats: &SessionStats) {
        self.send_stats("game_over", stats);
    }

    fn on_win(&mut self, stats: &SessionStats) {
        self.send_stats("win", stats);
    }

    fn on_paused(&mut self) {
        self.send("paused", serde_json::Value::Null);
    }

    fn on_resumed(&mut self) {
        request_pointer_lock();
        self.send("resumed", serde_json::Value::Null);
    }

    fn on_quit(&mut self) {
        self.send("quit", serde_json::Value::Null);
    }
}

fn move_direction(name: &str) -> Option<MoveDirection> {
    match name.to_lowercase().as_str() {
        "forward" | "w" => Some(MoveDirection::Forward),
        "back" | "backward" | "s" => Some(MoveDirection::Back),
        "left" | "a" => Some(MoveDirection::Left),
        "right" | "d" => Some(MoveDirection::Right),
        _ => None,
    }
}

/// One game session driven by the page's animation loop
#[wasm_bindgen]
pub struct WebSession {
    shell: Shell<WebScene, WebFeedback>,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, render: Function, notify: Function) -> WebSession {
        let settings = Settings::load();
        let scene = WebScene {
            mirror: HeadlessScene::new(),
            render,
        };
        let feedback = WebFeedback { notify };
        log::info!("Session created with seed {}", seed as u64);
        WebSession {
            shell: Shell::new(settings, seed as u64, scene, feedback),
        }
    }

    /// Start a round; `mode` is "static", "tracking" or "parkour"
    pub fn start(&mut self, mode: &str) -> bool {
        match GameMode::from_str(mode) {
            Some(mode) => {
                let started = self.shell.start(mode);
                if started {
                    request_pointer_lock();
                }
                started
            }
            None => {
                log::warn!("Unknown game mode: {}", mode);
                false
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        self.shell.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.shell.resume()
    }

    pub fn retry(&mut self) -> bool {
        self.shell.retry()
    }

    pub fn quit(&mut self) -> bool {
        self.shell.quit()
    }

    pub fn fire(&mut self) {
        self.shell.handle_input(InputEvent::Fire);
    }

    pub fn jump(&mut self) {
        self.shell.handle_input(InputEvent::JumpRequested);
    }

    pub fn set_sprint(&mut self, on: bool) {
        self.shell.handle_input(InputEvent::SetSprint(on));
    }

    pub fn set_move_flag(&mut self, direction: &str, held: bool) {
        if let Some(direction) = move_direction(direction) {
            self.shell
                .handle_input(InputEvent::SetMoveFlag(direction, held));
        }
    }

    /// Pointer movement in pixels (movementX / movementY)
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.shell.handle_input(InputEvent::Look { dx, dy });
    }

    /// Call on `pointerlockchange` when the lock is gone
    pub fn look_lock_lost(&mut self) {
        self.shell.handle_input(InputEvent::LookLockLost);
    }

    /// Advance one animation frame (`dt` in seconds)
    pub fn frame(&mut self, dt: f32) {
        self.shell.frame(dt);
    }

    /// Camera pose as [x, y, z, yaw, pitch]
    pub fn camera(&self) -> Vec<f32> {
        let player = &self.shell.state().player;
        vec![
            player.position.x,
            player.position.y,
            player.position.z,
            player.yaw,
            player.pitch,
        ]
    }

    pub fn score(&self) -> f64 {
        self.shell.state().score
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.shell.state().phase)
    }

    pub fn save_settings(&self) {
        self.shell.settings().save();
    }
}
