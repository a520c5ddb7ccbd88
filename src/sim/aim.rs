//! Aim ray resolution
//!
//! The scene collaborator answers raycasts with hits sorted nearest first.
//! The resolver trusts that order and picks the first hit that refers to an
//! active target; anything else in front of it (inactive targets, platforms,
//! world geometry) is skipped.

use serde::{Deserialize, Serialize};

use super::geometry::Ray;
use super::target::{TargetId, TargetPool};

/// What a ray hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Target(TargetId),
    /// Index into the current level's platform list
    Platform(usize),
    /// Floor, walls or other scenery
    World,
}

/// A single ray intersection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    pub entity: EntityRef,
    pub distance: f32,
}

impl RayHit {
    pub fn new(entity: EntityRef, distance: f32) -> Self {
        Self { entity, distance }
    }
}

/// Scene collaborator that answers raycasts, nearest hit first
pub trait Raycaster {
    fn cast(&self, ray: &Ray) -> Vec<RayHit>;
}

/// Raycaster that never hits anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHits;

impl Raycaster for NoHits {
    fn cast(&self, _ray: &Ray) -> Vec<RayHit> {
        Vec::new()
    }
}

/// First active target in hit order, if any. An empty list is a miss.
pub fn resolve_aim(hits: &[RayHit], targets: &TargetPool) -> Option<(TargetId, f32)> {
    hits.iter().find_map(|hit| match hit.entity {
        EntityRef::Target(id) if targets.is_active(id) => Some((id, hit.distance)),
        _ => None,
    })
}

/// First non-target surface in hit order (used to place miss decals)
pub fn first_surface(hits: &[RayHit]) -> Option<RayHit> {
    hits.iter()
        .find(|hit| !matches!(hit.entity, EntityRef::Target(_)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_skips_inactive_nearer_target() {
        let mut pool = TargetPool::default();
        let inactive = pool.spawn(Vec3::new(0.0, 1.6, -1.0), None);
        let active = pool.spawn(Vec3::new(0.0, 1.6, -3.0), None);
        pool.despawn(inactive);

        let hits = [
            RayHit::new(EntityRef::Target(inactive), 1.0),
            RayHit::new(EntityRef::Target(active), 3.0),
        ];
        assert_eq!(resolve_aim(&hits, &pool), Some((active, 3.0)));
    }

    #[test]
    fn test_empty_is_miss() {
        let pool = TargetPool::default();
        assert_eq!(resolve_aim(&[], &pool), None);
        assert!(NoHits.cast(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).is_empty());
    }

    #[test]
    fn test_non_target_hits_are_skipped() {
        let mut pool = TargetPool::default();
        let id = pool.spawn(Vec3::ZERO, None);
        let hits = [
            RayHit::new(EntityRef::World, 0.5),
            RayHit::new(EntityRef::Platform(2), 1.0),
            RayHit::new(EntityRef::Target(id), 4.0),
        ];
        assert_eq!(resolve_aim(&hits, &pool), Some((id, 4.0)));
        assert_eq!(first_surface(&hits).map(|h| h.distance), Some(0.5));
    }

    #[test]
    fn test_unknown_target_id_is_ignored() {
        let pool = TargetPool::default();
        let hits = [RayHit::new(EntityRef::Target(TargetId(7)), 2.0)];
        assert_eq!(resolve_aim(&hits, &pool), None);
    }
}
