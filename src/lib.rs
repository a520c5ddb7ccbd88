//! Aim Parkour - first-person aim trainer and parkour mini-game core
//!
//! Core modules:
//! - `sim`: Headless simulation (player kinematics, targets, platforms, session)
//! - `shell`: Presentation shell that feeds input in and dispatches events out
//! - `scene`: Headless scene adapter (render mirror + raycasting)
//! - `settings`: User preferences and gameplay tuning

pub mod scene;
pub mod settings;
pub mod shell;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use settings::{Settings, Tuning};

/// Gameplay constants (defaults for `Tuning`)
pub mod consts {
    /// Longest frame delta the shell will feed into the simulation
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Camera height above the player's feet
    pub const EYE_HEIGHT: f32 = 1.6;
    /// Exponential horizontal friction coefficient (1/s)
    pub const FRICTION: f32 = 25.0;
    /// Downward acceleration, 3x real gravity for a snappier fall
    pub const GRAVITY: f32 = 9.8 * 3.0;
    /// Horizontal acceleration from movement input (units/s²)
    pub const MOVE_ACCEL: f32 = 320.0;
    /// Acceleration multiplier while sprinting
    pub const SPRINT_MULTIPLIER: f32 = 1.6;
    /// Upward velocity applied by a jump (units/s)
    pub const JUMP_VELOCITY: f32 = 10.0;
    /// Half-extent of the square arena in timed modes
    pub const ARENA_HALF_EXTENT: f32 = 19.0;
    /// Falling below this height in parkour resets the player to the start
    pub const FALL_LIMIT: f32 = -10.0;
    /// Vertical band below a platform top in which the feet can land
    pub const LANDING_TOLERANCE: f32 = 1.0;
    /// Pitch limit for the look direction (radians, ~89°)
    pub const MAX_PITCH: f32 = 1.553;

    /// Tracking-mode bounding box half-width (x), ceiling (y) and depth (z)
    pub const TARGET_RANGE: f32 = 8.0;
    /// Tracking-mode floor clamp
    pub const TARGET_MIN_Y: f32 = 1.0;
    /// Tracking target speed (units/s)
    pub const TARGET_SPEED: f32 = 6.0;
    /// Seconds between direction blends for tracking targets
    pub const TARGET_TURN_INTERVAL: f32 = 1.0;
    /// Weight of the freshly sampled direction in a blend
    pub const TARGET_TURN_BLEND: f32 = 0.5;
    /// Hit radius of a target sphere
    pub const TARGET_RADIUS: f32 = 0.5;
    /// Gameplay spawn box
    pub const SPAWN_X: (f32, f32) = (-7.5, 7.5);
    pub const SPAWN_Y: (f32, f32) = (1.0, 5.0);
    pub const SPAWN_Z: (f32, f32) = (-20.0, -5.0);

    /// Platform slab thickness (top surface = center y + half of this)
    pub const PLATFORM_HEIGHT: f32 = 0.5;
    pub const PLATFORM_COUNT: usize = 20;
    /// Height of the last regular platform above the start platform
    pub const LEVEL_MAX_HEIGHT: f32 = 30.0;
    pub const LEVEL_ANGLE_STEP: f32 = 0.6;
    pub const LEVEL_ANGLE_JITTER: f32 = 0.3;
    pub const LEVEL_RADIUS: (f32, f32) = (6.0, 11.0);
    /// Footprint of the first regular platform (square)
    pub const LEVEL_BASE_SIZE: f32 = 4.0;
    /// Smallest footprint as a fraction of the base size
    pub const LEVEL_MIN_SIZE_RATIO: f32 = 0.5;
    pub const START_PLATFORM_SIZE: f32 = 10.0;
    pub const START_PLATFORM_HEIGHT: f32 = 0.0;
    pub const GOAL_PLATFORM_SIZE: f32 = 3.0;

    /// Round length for static and tracking modes (seconds)
    pub const ROUND_SECONDS: f32 = 60.0;
    /// Number of simultaneously active targets in static mode
    pub const STATIC_TARGET_COUNT: usize = 3;
    /// Score for a discrete hit in static mode
    pub const POINTS_PER_HIT: f64 = 100.0;
    /// Score accrual rate while on target in tracking mode
    pub const TRACKING_POINTS_PER_SEC: f64 = 100.0;
}
