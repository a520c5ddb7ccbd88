//! Headless scene adapter
//!
//! Mirrors whatever the shell asks to draw and answers raycasts against that
//! mirror: targets are spheres, platforms are boxes and the arena floor is the
//! plane y = 0. Hidden targets still answer raycasts, the aim resolver is the
//! one that filters inactive targets out.

use std::collections::{BTreeMap, HashMap};

use glam::Vec3;

use crate::consts::TARGET_RADIUS;
use crate::shell::{DecalId, Feedback, RenderEntity, RenderSink};
use crate::sim::{EntityRef, GameMode, Platform, Ray, RayHit, Raycaster, SessionStats, TargetId};

#[derive(Debug, Clone, Copy)]
struct SceneTarget {
    position: Vec3,
    visible: bool,
}

/// In-memory render mirror with ray queries
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    targets: BTreeMap<TargetId, SceneTarget>,
    platforms: BTreeMap<usize, Platform>,
    decals: HashMap<DecalId, (Vec3, bool)>,
    target_radius: f32,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::with_target_radius(TARGET_RADIUS)
    }

    pub fn with_target_radius(target_radius: f32) -> Self {
        Self {
            target_radius,
            ..Default::default()
        }
    }

    /// Visible targets in id order
    pub fn visible_targets(&self) -> impl Iterator<Item = (TargetId, Vec3)> + '_ {
        self.targets
            .iter()
            .filter(|(_, t)| t.visible)
            .map(|(id, t)| (*id, t.position))
    }

    pub fn target_position(&self, id: TargetId) -> Option<Vec3> {
        self.targets.get(&id).map(|t| t.position)
    }

    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    pub fn decal_count(&self) -> usize {
        self.decals.len()
    }
}

impl RenderSink for HeadlessScene {
    fn add_target(&mut self, id: TargetId, position: Vec3) {
        self.targets.insert(
            id,
            SceneTarget {
                position,
                visible: true,
            },
        );
    }

    fn add_platform(&mut self, index: usize, platform: &Platform) {
        self.platforms.insert(index, platform.clone());
    }

    fn add_decal(&mut self, id: DecalId, position: Vec3, hit: bool) {
        self.decals.insert(id, (position, hit));
    }

    fn move_target(&mut self, id: TargetId, position: Vec3) {
        if let Some(target) = self.targets.get_mut(&id) {
            target.position = position;
        }
    }

    fn remove_entity(&mut self, entity: RenderEntity) {
        match entity {
            RenderEntity::Target(id) => {
                self.targets.remove(&id);
            }
            RenderEntity::Platform(index) => {
                self.platforms.remove(&index);
            }
            RenderEntity::Decal(id) => {
                self.decals.remove(&id);
            }
        }
    }

    fn set_visible(&mut self, entity: RenderEntity, visible: bool) {
        if let RenderEntity::Target(id) = entity {
            if let Some(target) = self.targets.get_mut(&id) {
                target.visible = visible;
            }
        }
    }
}

impl Raycaster for HeadlessScene {
    fn cast(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = Vec::new();

        for (id, target) in &self.targets {
            if let Some(t) = ray.intersect_sphere(target.position, self.target_radius) {
                hits.push(RayHit::new(EntityRef::Target(*id), t));
            }
        }

        for (index, platform) in &self.platforms {
            let (min, max) = platform.bounds();
            if let Some(t) = ray.intersect_aabb(min, max) {
                hits.push(RayHit::new(EntityRef::Platform(*index), t));
            }
        }

        // Floor plane
        if ray.direction.y < 0.0 && ray.origin.y >= 0.0 {
            let t = -ray.origin.y / ray.direction.y;
            hits.push(RayHit::new(EntityRef::World, t));
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Feedback sink that writes every notification to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl Feedback for LogFeedback {
    fn on_started(&mut self, mode: GameMode) {
        log::info!("[feedback] started {}", mode.as_str());
    }

    fn on_shoot(&mut self) {
        log::trace!("[feedback] shoot");
    }

    fn on_hit(&mut self, point: Vec3) {
        log::debug!("[feedback] hit at {:?}", point);
    }

    fn on_miss(&mut self) {
        log::debug!("[feedback] miss");
    }

    fn on_tracking_changed(&mut self, on_target: bool) {
        log::debug!("[feedback] on target: {}", on_target);
    }

    fn on_score_changed(&mut self, score: f64) {
        log::trace!("[feedback] score {:.0}", score);
    }

    fn on_time_changed(&mut self, seconds: f32) {
        log::trace!("[feedback] time {:.2}", seconds);
    }

    fn on_respawned(&mut self) {
        log::debug!("[feedback] respawned");
    }

    fn on_game_over(&mut self, stats: &SessionStats) {
        log::info!(
            "[feedback] game over: score {:.0}, accuracy {:.0}%",
            stats.score,
            stats.accuracy * 100.0
        );
    }

    fn on_win(&mut self, stats: &SessionStats) {
        log::info!(
            "[feedback] goal reached in {:.2}s",
            stats.completion_time.unwrap_or(stats.elapsed)
        );
    }

    fn on_paused(&mut self) {
        log::info!("[feedback] paused");
    }

    fn on_resumed(&mut self) {
        log::info!("[feedback] resumed, re-acquire look lock");
    }

    fn on_quit(&mut self) {
        log::info!("[feedback] quit");
    }
}
