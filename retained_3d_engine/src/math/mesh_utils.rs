/// Mesh geometry helpers: face normals and flat-shading vertex flattening

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

/// Mesh vertex as stored in a group
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coord: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self { position, normal, tex_coord }
    }

    /// Raw bit pattern, used as an exact-equality hash key
    #[inline]
    fn bit_key(&self) -> [u32; 8] {
        bytemuck::cast(*self)
    }
}

/// Unit normal of triangle (v0, v1, v2): `normalize((v1 - v0) x (v2 - v0))`.
///
/// Degenerate triangles give the zero vector.
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

/// Explode a triangle list for flat shading, then merge identical vertices.
///
/// Every triangle gets its own three vertices carrying the face normal (and a
/// zeroed texture coordinate when `has_texture` is false). Vertices that end
/// up bit-identical anywhere in the mesh are merged, so the output never has
/// more vertices than `indices.len()`.
///
/// Index triples referencing a missing vertex are skipped; a trailing
/// partial triple is ignored.
pub fn flatten_surfaces(vertices: &[Vertex], indices: &[u32], has_texture: bool) -> (Vec<Vertex>, Vec<u32>) {
    let mut unique: FxHashMap<[u32; 8], u32> = FxHashMap::default();
    let mut out_vertices = Vec::with_capacity(vertices.len());
    let mut out_indices = Vec::with_capacity(indices.len());

    for tri in indices.chunks_exact(3) {
        let fetch = |i: u32| vertices.get(i as usize).copied();
        let (Some(mut v0), Some(mut v1), Some(mut v2)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
            continue;
        };

        let normal = triangle_normal(v0.position, v1.position, v2.position);
        for v in [&mut v0, &mut v1, &mut v2] {
            v.normal = normal;
            if !has_texture {
                v.tex_coord = Vec2::ZERO;
            }
        }

        for v in [v0, v1, v2] {
            let index = *unique.entry(v.bit_key()).or_insert_with(|| {
                out_vertices.push(v);
                (out_vertices.len() - 1) as u32
            });
            out_indices.push(index);
        }
    }

    (out_vertices, out_indices)
}

#[cfg(test)]
#[path = "mesh_utils_tests.rs"]
mod tests;
