//! Player kinematics
//!
//! The player is a point at camera (eye) height. Horizontal velocity lives in
//! the look frame (x = strafe right, z = forward) and is turned into world
//! displacement through the yaw basis, so looking around never changes how
//! fast the player is drifting. Vertical motion is plain world-space Y.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::{Ray, forward_vector, look_direction, right_vector, within_footprint};
use super::level::Platform;
use crate::consts::*;

/// Kinematic tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub eye_height: f32,
    pub friction: f32,
    pub gravity: f32,
    pub move_accel: f32,
    pub sprint_multiplier: f32,
    pub jump_velocity: f32,
    pub arena_half_extent: f32,
    pub fall_limit: f32,
    pub landing_tolerance: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            eye_height: EYE_HEIGHT,
            friction: FRICTION,
            gravity: GRAVITY,
            move_accel: MOVE_ACCEL,
            sprint_multiplier: SPRINT_MULTIPLIER,
            jump_velocity: JUMP_VELOCITY,
            arena_half_extent: ARENA_HALF_EXTENT,
            fall_limit: FALL_LIMIT,
            landing_tolerance: LANDING_TOLERANCE,
        }
    }
}

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl MoveInput {
    /// Normalized (right, forward) intent, zero when no key or opposing keys are held
    pub fn intent(&self) -> Vec2 {
        let x = self.right as i8 - self.left as i8;
        let z = self.forward as i8 - self.back as i8;
        Vec2::new(x as f32, z as f32).normalize_or_zero()
    }
}

/// Result of a successful platform landing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    /// Index into the level's platform list
    pub platform: usize,
    pub is_goal: bool,
}

/// Kinematic state of the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Camera (eye) position
    pub position: Vec3,
    /// x = strafe, y = vertical, z = forward (look frame)
    pub velocity: Vec3,
    pub grounded: bool,
    pub sprint: bool,
    pub yaw: f32,
    pub pitch: f32,
}

impl PlayerState {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            sprint: false,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Teleport with zero velocity, facing the targets
    pub fn reset(&mut self, position: Vec3) {
        *self = Self::new(position);
    }

    /// Apply a look delta (radians). Pitch is clamped short of straight up/down.
    pub fn look(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw = (self.yaw + d_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Aim ray from the camera through the viewport center
    pub fn aim_ray(&self) -> Ray {
        Ray::new(self.position, look_direction(self.yaw, self.pitch))
    }

    /// Y of the feet
    #[inline]
    pub fn feet(&self, tuning: &PlayerTuning) -> f32 {
        self.position.y - tuning.eye_height
    }

    /// Jump if grounded. Airborne requests are dropped.
    pub fn jump(&mut self, tuning: &PlayerTuning) -> bool {
        if !self.grounded {
            return false;
        }
        self.velocity.y = tuning.jump_velocity;
        self.grounded = false;
        true
    }

    /// Advance velocity and position by `dt`
    pub fn integrate(&mut self, dt: f32, input: &MoveInput, tuning: &PlayerTuning) {
        let dt = dt.max(0.0);
        self.sprint = input.sprint;

        // Exponential friction, clamped so a long frame stops rather than overshoots
        let damping = (tuning.friction * dt).min(1.0);
        self.velocity.x -= self.velocity.x * damping;
        self.velocity.z -= self.velocity.z * damping;

        self.velocity.y -= tuning.gravity * dt;

        let intent = input.intent();
        let accel = if input.sprint {
            tuning.move_accel * tuning.sprint_multiplier
        } else {
            tuning.move_accel
        };
        if input.forward || input.back {
            self.velocity.z += intent.y * accel * dt;
        }
        if input.left || input.right {
            self.velocity.x += intent.x * accel * dt;
        }

        self.position += right_vector(self.yaw) * (self.velocity.x * dt);
        self.position += forward_vector(self.yaw) * (self.velocity.z * dt);
        self.position.y += self.velocity.y * dt;
    }

    /// Flat-floor and arena-wall resolution for the timed modes
    pub fn resolve_arena(&mut self, tuning: &PlayerTuning) {
        let floor = tuning.eye_height;
        let resting = self.position.y == floor && self.velocity.y <= 0.0;
        if self.position.y < floor || resting {
            self.position.y = floor;
            self.velocity.y = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        let limit = tuning.arena_half_extent;
        self.position.x = self.position.x.clamp(-limit, limit);
        self.position.z = self.position.z.clamp(-limit, limit);
    }

    /// Land on the first platform (in list order) whose landing band holds the feet
    pub fn land_on_platforms(
        &mut self,
        platforms: &[Platform],
        tuning: &PlayerTuning,
    ) -> Option<Landing> {
        if self.velocity.y > 0.0 {
            self.grounded = false;
            return None;
        }

        let feet = self.feet(tuning);
        for (index, platform) in platforms.iter().enumerate() {
            let top = platform.top();
            if !within_footprint(self.position, platform.position, platform.footprint) {
                continue;
            }
            if feet < top - tuning.landing_tolerance || feet > top {
                continue;
            }

            self.velocity.y = 0.0;
            self.position.y = top + tuning.eye_height;
            self.grounded = true;
            return Some(Landing {
                platform: index,
                is_goal: platform.is_goal,
            });
        }

        self.grounded = false;
        None
    }

    /// Whether the player dropped out of the parkour course
    pub fn fell_out(&self, tuning: &PlayerTuning) -> bool {
        self.position.y < tuning.fall_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn platform_at(center: Vec3, size: f32, is_goal: bool) -> Platform {
        Platform::new(center, Vec2::splat(size), is_goal)
    }

    #[test]
    fn test_intent_normalized() {
        let input = MoveInput {
            forward: true,
            right: true,
            ..Default::default()
        };
        assert!((input.intent().length() - 1.0).abs() < 1e-6);

        let opposed = MoveInput {
            forward: true,
            back: true,
            ..Default::default()
        };
        assert_eq!(opposed.intent(), Vec2::ZERO);
    }

    #[test]
    fn test_forward_moves_along_look() {
        let tuning = PlayerTuning::default();
        let mut player = PlayerState::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
        let input = MoveInput {
            forward: true,
            ..Default::default()
        };
        for _ in 0..10 {
            player.integrate(1.0 / 60.0, &input, &tuning);
            player.resolve_arena(&tuning);
        }
        assert!(player.position.z < 0.0);
        assert!(player.position.x.abs() < 1e-4);

        // Turning 90° right turns the same input into +X motion
        let mut player = PlayerState::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
        player.look(std::f32::consts::FRAC_PI_2, 0.0);
        for _ in 0..10 {
            player.integrate(1.0 / 60.0, &input, &tuning);
        }
        assert!(player.position.x > 0.0);
    }

    #[test]
    fn test_sprint_is_faster() {
        let tuning = PlayerTuning::default();
        let walk = MoveInput {
            forward: true,
            ..Default::default()
        };
        let sprint = MoveInput {
            sprint: true,
            ..walk
        };
        let mut a = PlayerState::new(Vec3::ZERO);
        let mut b = PlayerState::new(Vec3::ZERO);
        a.integrate(0.01, &walk, &tuning);
        b.integrate(0.01, &sprint, &tuning);
        assert!((b.velocity.z / a.velocity.z - SPRINT_MULTIPLIER).abs() < 1e-4);
        assert!(b.sprint);
    }

    #[test]
    fn test_friction_decays_without_input() {
        let tuning = PlayerTuning::default();
        let mut player = PlayerState::new(Vec3::ZERO);
        player.velocity = Vec3::new(5.0, 0.0, 5.0);
        player.integrate(0.01, &MoveInput::default(), &tuning);
        assert!((player.velocity.x - 5.0 * (1.0 - FRICTION * 0.01)).abs() < 1e-4);

        // Huge frame stops the player instead of flipping the velocity
        player.integrate(10.0, &MoveInput::default(), &tuning);
        assert_eq!(player.velocity.x, 0.0);
        assert_eq!(player.velocity.z, 0.0);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let tuning = PlayerTuning::default();
        let mut player = PlayerState::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
        player.resolve_arena(&tuning);
        player.integrate(0.0, &MoveInput::default(), &tuning);
        player.resolve_arena(&tuning);
        assert!(player.grounded);

        assert!(player.jump(&tuning));
        assert_eq!(player.velocity.y, JUMP_VELOCITY);
        assert!(!player.grounded);

        // No double jump
        assert!(!player.jump(&tuning));
        assert_eq!(player.velocity.y, JUMP_VELOCITY);
    }

    #[test]
    fn test_floor_snap_and_arena_clamp() {
        let tuning = PlayerTuning::default();
        let mut player = PlayerState::new(Vec3::new(25.0, 0.5, -30.0));
        player.velocity.y = -4.0;
        player.resolve_arena(&tuning);
        assert_eq!(player.position, Vec3::new(19.0, EYE_HEIGHT, -19.0));
        assert_eq!(player.velocity.y, 0.0);
        assert!(player.grounded);
    }

    #[test]
    fn test_lands_on_platform() {
        let tuning = PlayerTuning::default();
        let platform = platform_at(Vec3::new(0.0, 2.0, 0.0), 6.0, false);
        let top = platform.top();
        assert_eq!(top, 2.25);

        let mut player = PlayerState::new(Vec3::new(0.0, top + 1.0, 0.0));
        player.velocity.y = -2.0;
        let landing = player.land_on_platforms(std::slice::from_ref(&platform), &tuning);

        assert_eq!(
            landing,
            Some(Landing {
                platform: 0,
                is_goal: false
            })
        );
        assert_eq!(player.velocity.y, 0.0);
        assert_eq!(player.position.y, top + EYE_HEIGHT);
        assert!(player.grounded);
    }

    #[test]
    fn test_no_landing_while_rising_or_outside() {
        let tuning = PlayerTuning::default();
        let platforms = [platform_at(Vec3::new(0.0, 2.0, 0.0), 6.0, false)];

        let mut rising = PlayerState::new(Vec3::new(0.0, 3.25, 0.0));
        rising.velocity.y = 3.0;
        assert!(rising.land_on_platforms(&platforms, &tuning).is_none());

        let mut outside = PlayerState::new(Vec3::new(3.5, 3.25, 0.0));
        outside.velocity.y = -1.0;
        assert!(outside.land_on_platforms(&platforms, &tuning).is_none());

        // Feet more than the tolerance below the top
        let mut below = PlayerState::new(Vec3::new(0.0, 2.25 - 1.2 + EYE_HEIGHT, 0.0));
        below.velocity.y = -1.0;
        assert!(below.land_on_platforms(&platforms, &tuning).is_none());
        assert!(!below.grounded);
    }

    #[test]
    fn test_first_platform_in_order_wins() {
        let tuning = PlayerTuning::default();
        // Overlapping footprints, the second one is slightly higher
        let platforms = [
            platform_at(Vec3::new(0.0, 2.0, 0.0), 4.0, false),
            platform_at(Vec3::new(0.5, 2.4, 0.0), 4.0, true),
        ];
        let mut player = PlayerState::new(Vec3::new(0.0, 2.2 + EYE_HEIGHT, 0.0));
        player.velocity.y = -1.0;
        let landing = player.land_on_platforms(&platforms, &tuning);
        assert_eq!(landing.map(|l| l.platform), Some(0));
        assert_eq!(player.position.y, 2.25 + EYE_HEIGHT);
    }

    proptest! {
        #[test]
        fn prop_integrate_stays_finite(
            steps in prop::collection::vec(
                (0.0f32..2.0, any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), -0.2f32..0.2),
                1..300,
            ),
        ) {
            let tuning = PlayerTuning::default();
            let mut player = PlayerState::new(Vec3::new(0.0, EYE_HEIGHT, 0.0));
            for (dt, forward, back, left, right, sprint, jump, turn) in steps {
                let input = MoveInput { forward, back, left, right, sprint };
                if jump {
                    player.jump(&tuning);
                }
                player.look(turn, turn * 0.5);
                player.integrate(dt, &input, &tuning);
                player.resolve_arena(&tuning);

                prop_assert!(player.position.is_finite());
                prop_assert!(player.velocity.is_finite());
                prop_assert!(player.position.y >= tuning.eye_height);
                if player.grounded {
                    prop_assert_eq!(player.velocity.y, 0.0);
                    prop_assert_eq!(player.position.y, tuning.eye_height);
                }
            }
        }
    }
}
