//! Shootable targets and the pool that recycles them
//!
//! Targets are plain data records addressed by `TargetId` (an index into the
//! pool). The pool only ever grows: a despawned target stays allocated and is
//! handed out again by the next `acquire`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geometry::{random_point_in, random_unit_vector};
use super::rng::RandomSource;
use super::state::GameMode;
use crate::consts::*;

/// Stable handle to a pooled target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub usize);

/// Motion and spawn parameters for targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetTuning {
    /// Tracking box: |x| <= range, y in [min_y, range], z in [-2 * range, 0]
    pub range: f32,
    pub min_y: f32,
    pub speed: f32,
    /// Seconds between heading blends
    pub turn_interval: f32,
    /// Weight given to the new random heading in a blend
    pub turn_blend: f32,
    pub spawn_x: (f32, f32),
    pub spawn_y: (f32, f32),
    pub spawn_z: (f32, f32),
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            range: TARGET_RANGE,
            min_y: TARGET_MIN_Y,
            speed: TARGET_SPEED,
            turn_interval: TARGET_TURN_INTERVAL,
            turn_blend: TARGET_TURN_BLEND,
            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            spawn_z: SPAWN_Z,
        }
    }
}

impl TargetTuning {
    /// Sample a gameplay spawn point
    pub fn sample_spawn(&self, rng: &mut dyn RandomSource) -> Vec3 {
        random_point_in(rng, self.spawn_x, self.spawn_y, self.spawn_z)
    }
}

/// A single target record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub position: Vec3,
    pub active: bool,
    /// Unit heading (only meaningful in tracking mode)
    pub direction: Vec3,
    pub speed: f32,
    /// Seconds until the next heading blend
    pub turn_countdown: f32,
}

impl Target {
    fn new(speed: f32, turn_interval: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            active: false,
            direction: Vec3::NEG_Z,
            speed,
            turn_countdown: turn_interval,
        }
    }

    /// Place and activate the target. A heading is only given in tracking contexts.
    pub fn spawn(&mut self, position: Vec3, heading: Option<Vec3>, turn_interval: f32) {
        self.position = position;
        self.active = true;
        self.turn_countdown = turn_interval;
        if let Some(heading) = heading {
            self.direction = heading.normalize_or(Vec3::X);
        }
    }

    pub fn despawn(&mut self) {
        self.active = false;
    }

    /// Advance tracking motion. Returns true if the position changed.
    pub fn update(
        &mut self,
        dt: f32,
        mode: GameMode,
        tuning: &TargetTuning,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if !self.active || mode != GameMode::Tracking {
            return false;
        }

        self.position += self.direction * self.speed * dt;

        // Reflect off the tracking box, only when heading further out
        let range = tuning.range;
        if (self.position.x > range && self.direction.x > 0.0)
            || (self.position.x < -range && self.direction.x < 0.0)
        {
            self.direction.x = -self.direction.x;
        }
        if (self.position.y > range && self.direction.y > 0.0)
            || (self.position.y < tuning.min_y && self.direction.y < 0.0)
        {
            self.direction.y = -self.direction.y;
        }
        if (self.position.z > 0.0 && self.direction.z > 0.0)
            || (self.position.z < -2.0 * range && self.direction.z < 0.0)
        {
            self.direction.z = -self.direction.z;
        }

        self.turn_countdown -= dt;
        if self.turn_countdown <= 0.0 {
            let fresh = random_unit_vector(rng);
            let blended = self.direction * (1.0 - tuning.turn_blend) + fresh * tuning.turn_blend;
            // Exactly opposite headings cancel out; keep the fresh one then
            self.direction = blended.normalize_or(fresh);
            self.turn_countdown = tuning.turn_interval;
        }

        true
    }
}

/// Grow-only arena of targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetPool {
    targets: Vec<Target>,
    tuning: TargetTuning,
}

impl TargetPool {
    pub fn new(tuning: TargetTuning) -> Self {
        Self {
            targets: Vec::new(),
            tuning,
        }
    }

    pub fn tuning(&self) -> &TargetTuning {
        &self.tuning
    }

    /// Return an inactive target, allocating a new one only if none is free
    pub fn acquire(&mut self) -> TargetId {
        if let Some(idx) = self.targets.iter().position(|t| !t.active) {
            return TargetId(idx);
        }
        self.targets
            .push(Target::new(self.tuning.speed, self.tuning.turn_interval));
        log::debug!("Target pool grew to {}", self.targets.len());
        TargetId(self.targets.len() - 1)
    }

    /// Acquire a target and spawn it at `position`
    pub fn spawn(&mut self, position: Vec3, heading: Option<Vec3>) -> TargetId {
        let id = self.acquire();
        let turn_interval = self.tuning.turn_interval;
        self.targets[id.0].spawn(position, heading, turn_interval);
        id
    }

    /// Deactivate a target. Returns false if it was not active.
    pub fn despawn(&mut self, id: TargetId) -> bool {
        match self.targets.get_mut(id.0) {
            Some(target) if target.active => {
                target.despawn();
                true
            }
            _ => false,
        }
    }

    /// Same as `despawn`; feedback is raised by the caller as a `Hit` event
    pub fn hit(&mut self, id: TargetId) -> bool {
        self.despawn(id)
    }

    /// Deactivate every target, returning the ids that were active
    pub fn despawn_all(&mut self) -> Vec<TargetId> {
        let mut despawned = Vec::new();
        for (idx, target) in self.targets.iter_mut().enumerate() {
            if target.active {
                target.despawn();
                despawned.push(TargetId(idx));
            }
        }
        despawned
    }

    /// Advance every active target. Returns the ids that moved.
    pub fn update(&mut self, dt: f32, mode: GameMode, rng: &mut dyn RandomSource) -> Vec<TargetId> {
        let mut moved = Vec::new();
        for (idx, target) in self.targets.iter_mut().enumerate() {
            if target.update(dt, mode, &self.tuning, rng) {
                moved.push(TargetId(idx));
            }
        }
        moved
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(id.0)
    }

    pub fn is_active(&self, id: TargetId) -> bool {
        self.get(id).is_some_and(|t| t.active)
    }

    /// Iterate active targets with their ids
    pub fn active(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.targets
            .iter()
            .enumerate()
            .filter(|(_, t)| t.active)
            .map(|(idx, t)| (TargetId(idx), t))
    }

    pub fn active_count(&self) -> usize {
        self.targets.iter().filter(|t| t.active).count()
    }

    /// Number of allocated targets (active or not)
    pub fn capacity(&self) -> usize {
        self.targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::SeededRandom;
    use proptest::prelude::*;

    #[test]
    fn test_pool_reuses_inactive() {
        let mut pool = TargetPool::default();
        for _ in 0..10 {
            let id = pool.spawn(Vec3::new(0.0, 2.0, -10.0), None);
            assert!(pool.is_active(id));
            assert!(pool.hit(id));
        }
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_pool_grows_only_when_full() {
        let mut pool = TargetPool::default();
        let a = pool.spawn(Vec3::ZERO, None);
        let b = pool.spawn(Vec3::ONE, None);
        assert_ne!(a, b);
        assert_eq!(pool.capacity(), 2);

        pool.despawn(a);
        let c = pool.spawn(Vec3::X, None);
        assert_eq!(c, a);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_despawn_inactive_is_noop() {
        let mut pool = TargetPool::default();
        let id = pool.spawn(Vec3::ZERO, None);
        assert!(pool.despawn(id));
        assert!(!pool.despawn(id));
        assert!(!pool.despawn(TargetId(99)));
    }

    #[test]
    fn test_static_targets_do_not_move() {
        let mut pool = TargetPool::default();
        let mut rng = SeededRandom::new(1);
        let id = pool.spawn(Vec3::new(1.0, 2.0, -8.0), Some(Vec3::X));
        let moved = pool.update(0.5, GameMode::Static, &mut rng);
        assert!(moved.is_empty());
        assert_eq!(pool.get(id).map(|t| t.position), Some(Vec3::new(1.0, 2.0, -8.0)));
    }

    #[test]
    fn test_tracking_integrates_position() {
        let mut pool = TargetPool::default();
        let mut rng = SeededRandom::new(1);
        let id = pool.spawn(Vec3::new(0.0, 4.0, -8.0), Some(Vec3::X));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let target = pool.get(id).cloned().unwrap_or_else(|| Target::new(0.0, 1.0));
        assert!((target.position.x - TARGET_SPEED * 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_tracking_reflects_at_bounds() {
        let mut pool = TargetPool::default();
        let mut rng = SeededRandom::new(1);
        let id = pool.spawn(Vec3::new(TARGET_RANGE - 0.01, 4.0, -8.0), Some(Vec3::X));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.x < 0.0);

        // Floor clamp on y
        let id = pool.spawn(Vec3::new(0.0, TARGET_MIN_Y + 0.01, -8.0), Some(Vec3::NEG_Y));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.y > 0.0);

        // Never behind the player
        let id = pool.spawn(Vec3::new(0.0, 4.0, -0.01), Some(Vec3::Z));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.z < 0.0);

        // -x edge
        let id = pool.spawn(Vec3::new(-TARGET_RANGE + 0.01, 4.0, -8.0), Some(Vec3::NEG_X));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.x > 0.0);

        // Ceiling at y = range
        let id = pool.spawn(Vec3::new(0.0, TARGET_RANGE - 0.01, -8.0), Some(Vec3::Y));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.y < 0.0);

        // Far bound at z = -2 * range
        let id = pool.spawn(Vec3::new(0.0, 4.0, -2.0 * TARGET_RANGE + 0.01), Some(Vec3::NEG_Z));
        pool.update(0.1, GameMode::Tracking, &mut rng);
        let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
        assert!(dir.z > 0.0);
    }

    #[test]
    fn test_heading_blend_after_interval() {
        let mut pool = TargetPool::default();
        let mut rng = SeededRandom::new(9);
        let id = pool.spawn(Vec3::new(0.0, 4.0, -8.0), Some(Vec3::X));
        pool.update(TARGET_TURN_INTERVAL + 0.01, GameMode::Tracking, &mut rng);
        let target = pool.get(id).cloned().unwrap_or_else(|| Target::new(0.0, 1.0));
        assert!((target.turn_countdown - TARGET_TURN_INTERVAL).abs() < 1e-6);
        assert!((target.direction.length() - 1.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_pool_never_exceeds_spawn_count(n in 1usize..50) {
            let mut pool = TargetPool::default();
            for i in 0..n {
                let id = pool.spawn(Vec3::splat(i as f32), None);
                pool.despawn(id);
            }
            prop_assert!(pool.capacity() <= 1);
        }

        #[test]
        fn prop_tracking_direction_stays_unit(
            seed in any::<u64>(),
            steps in prop::collection::vec(0.0f32..0.5, 1..200),
        ) {
            let mut rng = SeededRandom::new(seed);
            let mut pool = TargetPool::default();
            let heading = random_unit_vector(&mut rng);
            let start = pool.tuning().sample_spawn(&mut rng);
            let id = pool.spawn(start, Some(heading));
            for dt in steps {
                pool.update(dt, GameMode::Tracking, &mut rng);
                let dir = pool.get(id).map(|t| t.direction).unwrap_or_default();
                prop_assert!((dir.length() - 1.0).abs() < 1e-4);
            }
        }
    }
}
