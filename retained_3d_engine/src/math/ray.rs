/// Ray casting against boxes and triangles, used by viewport picking

use glam::Vec3;
use crate::math::AABB;

/// Below this magnitude a direction component or determinant counts as zero
pub const RAY_EPSILON: f32 = 1e-6;

/// Half-line `origin + t * direction`, `t >= 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction` (zero stays zero)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test.
    ///
    /// Returns the entry distance, or the exit distance when the origin is
    /// inside the box. `None` when the ray misses or the box is behind it.
    pub fn intersect_aabb(&self, aabb: &AABB) -> Option<f32> {
        let mut tmin = -f32::MAX;
        let mut tmax = f32::MAX;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);

            if dir.abs() < RAY_EPSILON {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t1 = (lo - origin) * inv;
            let mut t2 = (hi - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax || tmax < 0.0 {
                return None;
            }
        }

        Some(if tmin >= 0.0 { tmin } else { tmax })
    }

    /// Möller–Trumbore ray/triangle intersection.
    ///
    /// Both windings hit. Returns the distance along the ray for hits strictly
    /// in front of the origin.
    pub fn intersect_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = self.direction.cross(edge2);
        let a = edge1.dot(h);
        if a.abs() < RAY_EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = self.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = f * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(q);
        (t > RAY_EPSILON).then_some(t)
    }
}

#[cfg(test)]
#[path = "ray_tests.rs"]
mod tests;
