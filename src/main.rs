//! Aim Parkour entry point
//!
//! The browser build is driven from JavaScript through `aim_parkour::web`.
//! Natively this runs scripted headless sessions and logs the results.
//!
//! Usage: `aim-parkour [static|tracking|parkour|all] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use aim_parkour::Settings;
    use aim_parkour::scene::{HeadlessScene, LogFeedback};
    use aim_parkour::shell::{InputEvent, MoveDirection, Shell};
    use aim_parkour::sim::{GameMode, GamePhase, GameState, PlayerState};
    use glam::{Vec2, Vec3};

    type DemoShell = Shell<HeadlessScene, LogFeedback>;

    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on parkour after this many simulated seconds
    const PARKOUR_TIMEOUT: f32 = 180.0;

    /// Yaw/pitch delta (radians) that turns the camera towards `point`
    fn look_towards(player: &PlayerState, point: Vec3) -> Vec2 {
        let d = point - player.position;
        let yaw = d.x.atan2(-d.z);
        let pitch = d.y.atan2(Vec2::new(d.x, d.z).length());
        let mut d_yaw = (yaw - player.yaw).rem_euclid(std::f32::consts::TAU);
        if d_yaw > std::f32::consts::PI {
            d_yaw -= std::f32::consts::TAU;
        }
        Vec2::new(d_yaw, pitch - player.pitch)
    }

    /// Feed a look delta in radians through the pixel-based input path
    fn look(shell: &mut DemoShell, delta: Vec2) {
        let settings = shell.settings();
        let sensitivity = settings.mouse_sensitivity.max(f32::EPSILON);
        let dy = if settings.invert_y { delta.y } else { -delta.y };
        shell.handle_input(InputEvent::Look {
            dx: delta.x / sensitivity,
            dy: dy / sensitivity,
        });
    }

    fn nearest_target(state: &GameState) -> Option<Vec3> {
        let eye = state.player.position;
        state
            .targets
            .active()
            .map(|(_, t)| t.position)
            .min_by(|a, b| a.distance_squared(eye).total_cmp(&b.distance_squared(eye)))
    }

    /// Snap to the nearest target and fire a few times per second
    fn run_static(shell: &mut DemoShell) {
        let mut frame = 0u32;
        while shell.state().phase == GamePhase::Playing {
            if let Some(point) = nearest_target(shell.state()) {
                let delta = look_towards(&shell.state().player, point);
                look(shell, delta);
            }
            if frame % 20 == 0 {
                shell.handle_input(InputEvent::Fire);
            }
            shell.frame(FRAME_DT);
            frame += 1;
        }
    }

    /// Follow the moving target with some lag
    fn run_tracking(shell: &mut DemoShell) {
        while shell.state().phase == GamePhase::Playing {
            if let Some(point) = nearest_target(shell.state()) {
                let delta = look_towards(&shell.state().player, point) * 0.5;
                look(shell, delta);
            }
            shell.frame(FRAME_DT);
        }
    }

    /// Walk and jump towards the next platform up the spiral
    fn run_parkour(shell: &mut DemoShell) {
        let mut next = 1usize;
        shell.handle_input(InputEvent::SetMoveFlag(MoveDirection::Forward, true));
        while shell.state().phase == GamePhase::Playing && shell.state().elapsed < PARKOUR_TIMEOUT {
            let state = shell.state();
            let platforms = state.level.platforms();
            let player = &state.player;

            // Advance once standing on the platform we were heading for
            if player.grounded {
                if let Some(index) = platforms.iter().position(|p| {
                    (player.position.x - p.position.x).abs() <= p.footprint.x / 2.0
                        && (player.position.z - p.position.z).abs() <= p.footprint.y / 2.0
                        && (player.position.y - state.tuning.player.eye_height - p.top()).abs()
                            < 1e-3
                }) {
                    next = next.max(index + 1);
                }
            }

            let Some(goal) = platforms.get(next).or_else(|| platforms.last()) else {
                break;
            };
            let mut aim = goal.position;
            aim.y = player.position.y;
            let delta = look_towards(player, aim);
            let grounded = player.grounded;
            look(shell, Vec2::new(delta.x, 0.0));
            if grounded {
                shell.handle_input(InputEvent::JumpRequested);
            }
            shell.frame(FRAME_DT);
        }
        shell.handle_input(InputEvent::SetMoveFlag(MoveDirection::Forward, false));
    }

    fn run_mode(shell: &mut DemoShell, mode: GameMode) {
        if !shell.start(mode) {
            log::warn!("Could not start {} round", mode.as_str());
            return;
        }
        match mode {
            GameMode::Static => run_static(shell),
            GameMode::Tracking => run_tracking(shell),
            GameMode::Parkour => run_parkour(shell),
        }

        let stats = shell.state().stats();
        log::info!(
            "{}: score {:.0}, shots {}/{}, accuracy {:.1}%, time on target {:.1}s, elapsed {:.1}s, outcome {:?}",
            mode.as_str(),
            stats.score,
            stats.shots_hit,
            stats.shots_fired,
            stats.accuracy * 100.0,
            stats.time_on_target,
            stats.elapsed,
            stats.outcome
        );
        if shell.state().phase != GamePhase::Idle {
            shell.quit();
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let mode_arg = args.next().unwrap_or_else(|| "all".to_string());
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);

        let modes = if mode_arg == "all" {
            vec![GameMode::Static, GameMode::Tracking, GameMode::Parkour]
        } else {
            match GameMode::from_str(&mode_arg) {
                Some(mode) => vec![mode],
                None => {
                    log::error!("Unknown mode '{}', expected static, tracking, parkour or all", mode_arg);
                    return;
                }
            }
        };

        let settings = Settings::load();
        let mut shell = Shell::new(settings, seed, HeadlessScene::new(), LogFeedback);
        log::info!("Running headless sessions with seed {}", seed);
        for mode in modes {
            run_mode(&mut shell, mode);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Aim Parkour (native) starting...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is aim_parkour::web::wasm_init, this is just to satisfy the compiler
}
