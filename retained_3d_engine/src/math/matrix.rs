/// Matrix helpers shared by the viewport and the renderer backends.
///
/// All matrices are glam column-major and act on column vectors
/// (`p' = M * p`). Legacy row-major, row-vector matrices convert with
/// `from_row_vector_rows()`: each legacy row becomes a glam column, so a
/// legacy product `A x B` is `G(B) * G(A)` here.
///
/// The coordinate system is left-handed: an identity camera looks down +Z,
/// +Y is up, and projected depth lies in [0, 1].

use glam::{Mat3, Mat4, Vec3, Vec4};
use crate::math::Rect;

/// Determinant magnitude under which a matrix is treated as singular
const SINGULAR_EPSILON: f32 = 1e-12;

/// Convert a legacy row-vector matrix (`m[row][col]`) to glam
pub fn from_row_vector_rows(rows: [[f32; 4]; 4]) -> Mat4 {
    Mat4::from_cols_array_2d(&rows)
}

/// Convert a glam matrix back to legacy row-vector layout
pub fn to_row_vector_rows(matrix: &Mat4) -> [[f32; 4]; 4] {
    matrix.to_cols_array_2d()
}

/// Inverse of a rigid (rotation + translation) transform.
///
/// The rotation block is transposed and the translation re-derived as
/// `-(R^T * t)`. Scale or shear in `matrix` gives a wrong result; use
/// `Mat4::inverse()` for those.
pub fn invert_orthogonal(matrix: &Mat4) -> Mat4 {
    let rotation_t = Mat3::from_mat4(*matrix).transpose();
    let translation = -(rotation_t * matrix.w_axis.truncate());
    Mat4::from_cols(
        rotation_t.x_axis.extend(0.0),
        rotation_t.y_axis.extend(0.0),
        rotation_t.z_axis.extend(0.0),
        translation.extend(1.0),
    )
}

/// Inverse-transpose of the upper 3x3 block, for transforming normals.
///
/// A singular block yields the zero matrix (every normal collapses to zero
/// and is skipped by lighting).
pub fn normal_matrix(matrix: &Mat4) -> Mat3 {
    let m = Mat3::from_mat4(*matrix);
    if m.determinant().abs() < SINGULAR_EPSILON {
        return Mat3::ZERO;
    }
    m.inverse().transpose()
}

/// Translation column of an affine transform
pub fn translation(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// Forward (local +Z) axis of an affine transform
pub fn forward(matrix: &Mat4) -> Vec3 {
    matrix.z_axis.truncate()
}

/// Perspective projection and its inverse, built from the viewport parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveProjection {
    pub projection: Mat4,
    pub inverse: Mat4,
}

impl PerspectiveProjection {
    /// Build the projection.
    ///
    /// `field` is the half-width of the view window at distance `front`.
    /// `virtual_aspect` is the aspect ratio the content was authored for and
    /// `window_aspect` the actual render target's; the wider of the two is
    /// letterboxed so the authored view never stretches.
    ///
    /// Depth maps `front -> 0` and `back -> 1`.
    pub fn new(front: f32, back: f32, field: f32, virtual_aspect: f32, window_aspect: f32) -> Self {
        let base_f = front / field;
        let mut f_v = base_f * virtual_aspect;
        let mut f_h = base_f;
        if window_aspect >= virtual_aspect {
            f_h *= virtual_aspect / window_aspect;
        } else {
            f_v *= window_aspect / virtual_aspect;
        }

        let depth = back - front;
        let q = back / depth;

        let projection = Mat4::from_cols(
            Vec4::new(f_h, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f_v, 0.0, 0.0),
            Vec4::new(0.0, 0.0, q, 1.0),
            Vec4::new(0.0, 0.0, -front * q, 0.0),
        );

        let inv_fb = depth / (-front * back);
        let inverse = Mat4::from_cols(
            Vec4::new(1.0 / f_h, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / f_v, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, inv_fb),
            Vec4::new(0.0, 0.0, 1.0, -q * inv_fb),
        );

        Self { projection, inverse }
    }

    /// Horizontal focal scale (`ndc.x = f_h * x / z`)
    pub fn focal_x(&self) -> f32 {
        self.projection.x_axis.x
    }

    /// Vertical focal scale (`ndc.y = f_v * y / z`)
    pub fn focal_y(&self) -> f32 {
        self.projection.y_axis.y
    }
}

/// Maps pixel coordinates of a `width x height` target to NDC, origin top-left.
pub fn create_orthographic_projection(width: f32, height: f32) -> Mat4 {
    from_row_vector_rows([
        [2.0 / width, 0.0, 0.0, 0.0],
        [0.0, -2.0 / height, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [-1.0, 1.0, 0.0, 1.0],
    ])
}

/// Maps the unit quad `[0,1]^2` onto `dst` after scaling and offsetting it.
pub fn create_2d_transform_matrix(dst: &Rect, scale: f32, offset_x: f32, offset_y: f32) -> Mat4 {
    let x = dst.x as f32 * scale + offset_x;
    let y = dst.y as f32 * scale + offset_y;
    let w = dst.w as f32 * scale;
    let h = dst.h as f32 * scale;
    from_row_vector_rows([
        [w, 0.0, 0.0, 0.0],
        [0.0, h, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [x, y, 0.0, 1.0],
    ])
}

/// NDC -> pixel coordinate on one axis
#[inline]
pub fn from_ndc(ndc: f32, dim: f32) -> f32 {
    (ndc * 0.5 + 0.5) * dim
}

#[cfg(test)]
#[path = "matrix_tests.rs"]
mod tests;
