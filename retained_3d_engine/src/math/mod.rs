/// Geometry and math utilities: bounding boxes, matrices, frustum, rays,
/// mesh flattening.

pub mod aabb;
pub mod frustum;
pub mod matrix;
pub mod mesh_utils;
pub mod ray;
pub mod rect;

pub use aabb::AABB;
pub use frustum::*;
pub use matrix::*;
pub use mesh_utils::{Vertex, flatten_surfaces, triangle_normal};
pub use ray::{Ray, RAY_EPSILON};
pub use rect::Rect;
