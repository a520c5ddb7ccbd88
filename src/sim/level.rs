//! Procedural parkour level
//!
//! Platforms climb a loose spiral around the start platform: each step turns
//! by a fixed angle plus jitter, sits at a random radius within a band, rises
//! by `max_height / count` and shrinks linearly towards a floor ratio. The set
//! is immutable once generated and is only ever replaced or cleared whole.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::consts::*;

/// A static slab the player can land on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Center of the slab
    pub position: Vec3,
    /// Width (x) and depth (z)
    pub footprint: Vec2,
    pub is_goal: bool,
}

impl Platform {
    pub fn new(position: Vec3, footprint: Vec2, is_goal: bool) -> Self {
        Self {
            position,
            footprint,
            is_goal,
        }
    }

    /// Y of the walkable top surface
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y + PLATFORM_HEIGHT / 2.0
    }

    /// Axis-aligned bounds (min, max)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let half = Vec3::new(self.footprint.x, PLATFORM_HEIGHT, self.footprint.y) / 2.0;
        (self.position - half, self.position + half)
    }
}

/// Level generation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub platform_count: usize,
    pub max_height: f32,
    pub angle_step: f32,
    pub angle_jitter: f32,
    pub radius: (f32, f32),
    pub base_size: f32,
    pub min_size_ratio: f32,
    pub start_size: f32,
    pub start_height: f32,
    pub goal_size: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            platform_count: PLATFORM_COUNT,
            max_height: LEVEL_MAX_HEIGHT,
            angle_step: LEVEL_ANGLE_STEP,
            angle_jitter: LEVEL_ANGLE_JITTER,
            radius: LEVEL_RADIUS,
            base_size: LEVEL_BASE_SIZE,
            min_size_ratio: LEVEL_MIN_SIZE_RATIO,
            start_size: START_PLATFORM_SIZE,
            start_height: START_PLATFORM_HEIGHT,
            goal_size: GOAL_PLATFORM_SIZE,
        }
    }
}

impl LevelConfig {
    /// Vertical distance between consecutive platforms
    pub fn height_step(&self) -> f32 {
        self.max_height / self.platform_count.max(1) as f32
    }
}

/// The generated platform set (start, regular platforms, goal - in that order)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Level {
    platforms: Vec<Platform>,
}

impl Level {
    /// Build a fresh level from the given random source
    pub fn generate(config: &LevelConfig, rng: &mut dyn RandomSource) -> Self {
        let count = config.platform_count;
        let step = config.height_step();
        let mut platforms = Vec::with_capacity(count + 2);

        platforms.push(Platform::new(
            Vec3::new(0.0, config.start_height, 0.0),
            Vec2::splat(config.start_size),
            false,
        ));

        let mut angle = 0.0f32;
        let mut radius = config.radius.0;
        let mut y = config.start_height;
        for i in 0..count {
            angle += config.angle_step + rng.range(-config.angle_jitter, config.angle_jitter);
            radius = rng.range(config.radius.0, config.radius.1);
            y += step;

            let t = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            let ratio = 1.0 - (1.0 - config.min_size_ratio) * t;
            let size = config.base_size * ratio;

            platforms.push(Platform::new(
                Vec3::new(angle.cos() * radius, y, angle.sin() * radius),
                Vec2::splat(size),
                false,
            ));
        }

        // One more spiral step (no jitter) past the last platform
        angle += config.angle_step;
        let goal_y = y + step;
        platforms.push(Platform::new(
            Vec3::new(angle.cos() * radius, goal_y, angle.sin() * radius),
            Vec2::splat(config.goal_size),
            true,
        ));

        log::info!(
            "Generated parkour level: {} platforms, goal at y={:.2}",
            platforms.len(),
            goal_y
        );

        Self { platforms }
    }

    /// Wrap a hand-built platform list (collision order is list order)
    pub fn from_platforms(platforms: Vec<Platform>) -> Self {
        Self { platforms }
    }

    /// Drop every platform
    pub fn clear(&mut self) {
        self.platforms.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Platforms in collision order
    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn start(&self) -> Option<&Platform> {
        self.platforms.first()
    }

    pub fn goal(&self) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.is_goal)
    }

    /// Camera position for (re)spawning on the start platform
    pub fn spawn_point(&self) -> Vec3 {
        match self.start() {
            Some(start) => Vec3::new(start.position.x, start.top() + EYE_HEIGHT, start.position.z),
            None => Vec3::new(0.0, EYE_HEIGHT, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SeededRandom;

    #[test]
    fn test_generate_layout() {
        let config = LevelConfig::default();
        let mut rng = SeededRandom::new(5);
        let level = Level::generate(&config, &mut rng);

        assert_eq!(level.len(), config.platform_count + 2);
        assert!(!level.platforms()[0].is_goal);
        assert!(level.platforms().last().is_some_and(|p| p.is_goal));
        assert_eq!(level.platforms().iter().filter(|p| p.is_goal).count(), 1);
    }

    #[test]
    fn test_heights_ascend_and_sizes_shrink() {
        let config = LevelConfig::default();
        let mut rng = SeededRandom::new(11);
        let level = Level::generate(&config, &mut rng);
        let regular = &level.platforms()[1..=config.platform_count];
        let step = config.height_step();

        for pair in regular.windows(2) {
            assert!((pair[1].position.y - pair[0].position.y - step).abs() < 1e-4);
            assert!(pair[1].footprint.x <= pair[0].footprint.x);
        }
        let last = &regular[regular.len() - 1];
        assert!((last.footprint.x - config.base_size * config.min_size_ratio).abs() < 1e-4);

        let goal = level.goal().cloned().unwrap_or_else(|| last.clone());
        assert!((goal.position.y - last.position.y - step).abs() < 1e-4);
    }

    #[test]
    fn test_radius_band() {
        let config = LevelConfig::default();
        let mut rng = SeededRandom::new(23);
        let level = Level::generate(&config, &mut rng);
        for p in &level.platforms()[1..=config.platform_count] {
            let r = Vec2::new(p.position.x, p.position.z).length();
            assert!(r >= config.radius.0 - 1e-3 && r <= config.radius.1 + 1e-3);
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let config = LevelConfig::default();
        let a = Level::generate(&config, &mut SeededRandom::new(77));
        let b = Level::generate(&config, &mut SeededRandom::new(77));
        assert_eq!(a.platforms(), b.platforms());
    }

    #[test]
    fn test_clear_and_spawn_point() {
        let config = LevelConfig::default();
        let mut level = Level::generate(&config, &mut SeededRandom::new(1));
        let spawn = level.spawn_point();
        assert!((spawn.y - (config.start_height + PLATFORM_HEIGHT / 2.0 + EYE_HEIGHT)).abs() < 1e-5);

        level.clear();
        assert!(level.is_empty());
        assert!(level.goal().is_none());
    }
}
