//! Vector and ray helpers shared by the simulation
//!
//! World convention: +Y is up, a yaw of 0 looks down -Z (towards the targets).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// A ray with a unit-length direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing the direction (falls back to -Z when degenerate)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec3::NEG_Z),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first intersection with a sphere, if any (t >= 0)
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let near = -b - sqrt_disc;
        if near >= 0.0 {
            return Some(near);
        }
        // Origin inside the sphere
        let far = -b + sqrt_disc;
        (far >= 0.0).then_some(far)
    }

    /// Distance to the first intersection with an axis-aligned box, if any (slab test)
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let inv = self.direction.recip();
        let t1 = (min - self.origin) * inv;
        let t2 = (max - self.origin) * inv;
        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();
        if t_far < 0.0 || t_near > t_far || t_near.is_nan() || t_far.is_nan() {
            return None;
        }
        Some(t_near.max(0.0))
    }
}

/// Look direction from yaw/pitch (radians)
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

/// Horizontal forward vector for a yaw (ignores pitch)
#[inline]
pub fn forward_vector(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right vector for a yaw
#[inline]
pub fn right_vector(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, yaw.sin())
}

/// Whether `point` lies over a rectangular footprint centered at `center` (XZ plane)
#[inline]
pub fn within_footprint(point: Vec3, center: Vec3, footprint: Vec2) -> bool {
    (point.x - center.x).abs() <= footprint.x / 2.0 && (point.z - center.z).abs() <= footprint.y / 2.0
}

/// Random unit vector (components sampled in [-1, 1) then normalized)
pub fn random_unit_vector(rng: &mut dyn RandomSource) -> Vec3 {
    let v = Vec3::new(
        rng.range(-1.0, 1.0),
        rng.range(-1.0, 1.0),
        rng.range(-1.0, 1.0),
    );
    v.normalize_or(Vec3::X)
}

/// Uniform point inside a box given per-axis (min, max) ranges
pub fn random_point_in(
    rng: &mut dyn RandomSource,
    x: (f32, f32),
    y: (f32, f32),
    z: (f32, f32),
) -> Vec3 {
    Vec3::new(rng.range(x.0, x.1), rng.range(y.0, y.1), rng.range(z.0, z.1))
}
