use glam::{Vec2, Vec3};
use super::*;

fn v(x: f32, y: f32, z: f32, u: f32, t: f32) -> Vertex {
    Vertex::new(Vec3::new(x, y, z), Vec3::Y, Vec2::new(u, t))
}

/// Unit square in the z = 0 plane, two triangles sharing the 0-2 diagonal
fn quad() -> (Vec<Vertex>, Vec<u32>) {
    (
        vec![
            v(0.0, 0.0, 0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0, 1.0, 0.0),
            v(1.0, 1.0, 0.0, 1.0, 1.0),
            v(0.0, 1.0, 0.0, 0.0, 1.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

/// Unit cube: 8 shared corners, 12 triangles
fn cube() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    for i in 0..8 {
        let (x, y, z) = ((i & 4) as f32 / 4.0, (i & 2) as f32 / 2.0, (i & 1) as f32);
        vertices.push(v(x, y, z, 0.0, 0.0));
    }
    let indices = vec![
        0, 1, 3, 0, 3, 2, // -x
        4, 6, 7, 4, 7, 5, // +x
        0, 4, 5, 0, 5, 1, // -y
        2, 3, 7, 2, 7, 6, // +y
        0, 2, 6, 0, 6, 4, // -z
        1, 5, 7, 1, 7, 3, // +z
    ];
    (vertices, indices)
}

// ============================================================================
// triangle_normal
// ============================================================================

#[test]
fn test_triangle_normal_orientation() {
    let n = triangle_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
    assert_eq!(n, Vec3::Z);
}

#[test]
fn test_triangle_normal_degenerate_is_zero() {
    let n = triangle_normal(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
    assert_eq!(n, Vec3::ZERO);
}

// ============================================================================
// flatten_surfaces
// ============================================================================

#[test]
fn test_flatten_coplanar_quad_shares_diagonal() {
    let (vertices, indices) = quad();
    let (flat, flat_indices) = flatten_surfaces(&vertices, &indices, false);

    assert_eq!(flat.len(), 4);
    assert_eq!(flat_indices, vec![0, 1, 2, 0, 2, 3]);
    for vertex in &flat {
        assert_eq!(vertex.normal, Vec3::Z);
        assert_eq!(vertex.tex_coord, Vec2::ZERO);
    }
}

#[test]
fn test_flatten_keeps_texcoords_when_textured() {
    let (vertices, indices) = quad();
    let (flat, _) = flatten_surfaces(&vertices, &indices, true);
    assert_eq!(flat[2].tex_coord, Vec2::new(1.0, 1.0));
}

#[test]
fn test_flatten_cube_splits_corners_per_face() {
    let (vertices, indices) = cube();
    let (flat, flat_indices) = flatten_surfaces(&vertices, &indices, false);

    // Each face keeps its own 4 corners with the face normal
    assert_eq!(flat.len(), 24);
    assert_eq!(flat_indices.len(), 36);
    assert!(flat.len() <= indices.len());
    for tri in flat_indices.chunks_exact(3) {
        let n = flat[tri[0] as usize].normal;
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert_eq!(flat[tri[1] as usize].normal, n);
        assert_eq!(flat[tri[2] as usize].normal, n);
    }
}

#[test]
fn test_flatten_is_idempotent() {
    let (vertices, indices) = cube();
    let first = flatten_surfaces(&vertices, &indices, false);
    let second = flatten_surfaces(&vertices, &indices, false);
    assert_eq!(first, second);
}

#[test]
fn test_flatten_skips_out_of_range_triangles() {
    let (vertices, _) = quad();
    let (flat, flat_indices) = flatten_surfaces(&vertices, &[0, 1, 9, 0, 1, 2, 3], false);
    assert_eq!(flat.len(), 3);
    assert_eq!(flat_indices, vec![0, 1, 2]);
}
