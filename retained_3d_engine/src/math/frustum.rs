/// Frustum: six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D) where (A, B, C) is the inward-pointing
/// normal. A point P is inside the frustum if `dot(plane, P_homogeneous) >= 0`
/// for all planes.
///
/// Planes are extracted for a [0, 1] depth range (the near plane is the
/// third row alone, not `row3 + row2`).

use glam::{Mat4, Vec3, Vec4};
use crate::math::AABB;

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method; each plane is normalized so that
    /// (A, B, C) is a unit vector and D is a true signed distance.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // m[col][row]: row i of the matrix is (m[0][i], m[1][i], m[2][i], m[3][i])
        let row = |i: usize| Vec4::new(m[0][i], m[1][i], m[2][i], m[3][i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Signed distance of a point to one plane (positive inside)
    #[inline]
    pub fn distance(&self, plane: usize, point: Vec3) -> f32 {
        self.planes[plane].truncate().dot(point) + self.planes[plane].w
    }

    /// Test 8 world-space corners against the frustum.
    ///
    /// The box is rejected only when all 8 corners lie strictly outside the
    /// SAME plane; a box straddling any plane is kept. This may keep boxes
    /// that are outside near a frustum edge, never the reverse.
    pub fn intersects_corners(&self, corners: &[Vec3; 8]) -> bool {
        for plane in 0..6 {
            let outside = corners
                .iter()
                .filter(|c| self.distance(plane, **c) < 0.0)
                .count();
            if outside == 8 {
                return false;
            }
        }
        true
    }

    /// Test a local-space box placed by `world` against the frustum
    pub fn intersects_aabb(&self, aabb: &AABB, world: &Mat4) -> bool {
        let corners = aabb.corners().map(|c| world.transform_point3(c));
        self.intersects_corners(&corners)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
