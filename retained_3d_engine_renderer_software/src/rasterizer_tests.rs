/// Tests for clipping, blending and scan conversion
use glam::Vec3;
use retained_3d_engine::retained3d::math::PerspectiveProjection;
use retained_3d_engine::retained3d::resource::PixelFormat;
use super::*;

// ============================================================================
// Helper Functions
// ============================================================================

const SIZE: u32 = 16;

fn vertex(x: f32, y: f32, z: f32, color: Color) -> PositionColorVertex {
    PositionColorVertex {
        position: Vec3::new(x, y, z),
        color,
        ..Default::default()
    }
}

/// Clockwise triangle at depth `z` covering the middle of the target
fn triangle_at(z: f32, color: Color) -> [PositionColorVertex; 3] {
    [vertex(-z, -z, z, color), vertex(0.0, z, z, color), vertex(z, -z, z, color)]
}

fn rasterizer() -> Rasterizer {
    Rasterizer::new(PerspectiveProjection::new(1.0, 10.0, 0.5, 1.0, 1.0).projection, 1.0)
}

struct Target {
    surface: Surface,
    depth: Vec<f32>,
    stats: RendererStats,
}

impl Target {
    fn new() -> Self {
        let mut surface = Surface::new(SIZE, SIZE, PixelFormat::Argb8888).unwrap();
        surface.fill(Color::BLACK);
        Self {
            surface,
            depth: vec![f32::INFINITY; (SIZE * SIZE) as usize],
            stats: RendererStats::default(),
        }
    }

    fn draw(&mut self, triangle: [PositionColorVertex; 3]) {
        rasterizer().draw_triangle(triangle, &mut self.surface, &mut self.depth, &mut self.stats);
    }

    fn center(&self) -> Color {
        self.surface.get_pixel(SIZE / 2, SIZE / 2).unwrap()
    }
}

const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

// ============================================================================
// CLIPPING
// ============================================================================

fn clipped(triangle: [PositionColorVertex; 3]) -> Vec<[PositionColorVertex; 3]> {
    let mut out = Vec::new();
    clip_near(triangle, 1.0, |t| out.push(t));
    out
}

#[test]
fn test_clip_keeps_visible_triangle() {
    let triangle = triangle_at(4.0, RED);
    assert_eq!(clipped(triangle), vec![triangle]);
}

#[test]
fn test_clip_discards_triangle_behind_near_plane() {
    assert!(clipped(triangle_at(0.5, RED)).is_empty());
}

#[test]
fn test_clip_one_vertex_behind_gives_two_triangles() {
    let triangle = [vertex(-1.0, -1.0, 0.5, RED), vertex(0.0, 1.0, 3.0, RED), vertex(1.0, -1.0, 3.0, RED)];
    let out = clipped(triangle);
    assert_eq!(out.len(), 2);
    for v in out.iter().flatten() {
        assert!(v.position.z >= 1.0 - 1e-6, "{:?}", v.position);
    }
}

#[test]
fn test_clip_two_vertices_behind_gives_one_triangle() {
    let triangle = [vertex(-1.0, -1.0, 0.5, RED), vertex(0.0, 1.0, 3.0, RED), vertex(1.0, -1.0, 0.0, RED)];
    let out = clipped(triangle);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0][1], triangle[1]);
    for v in &out[0] {
        assert!(v.position.z >= 1.0 - 1e-6);
    }
}

#[test]
fn test_split_edge_lands_on_plane() {
    let a = vertex(0.0, 0.0, 0.0, RED);
    let b = vertex(4.0, 2.0, 2.0, BLUE);
    let split = split_edge(a, &b, 1.0);
    assert_eq!(split.position, Vec3::new(2.0, 1.0, 1.0));
    assert_eq!(split.color, RED);
}

// ============================================================================
// BLENDING
// ============================================================================

#[test]
fn test_blend_extremes() {
    let dst = Color::rgba(10, 20, 30, 200);
    assert_eq!(blend(Color::rgba(255, 255, 255, 0), dst), dst);
    assert_eq!(blend(Color::rgba(1, 2, 3, 255), dst), Color::rgba(1, 2, 3, 255));
}

#[test]
fn test_blend_half() {
    let out = blend(Color::rgba(200, 0, 100, 128), Color::rgba(0, 200, 100, 255));
    assert!((out.r as i32 - 100).abs() <= 1);
    assert!((out.g as i32 - 99).abs() <= 1);
    assert!((out.b as i32 - 100).abs() <= 1);
    assert!(out.a >= 254);
}

// ============================================================================
// SCAN CONVERSION
// ============================================================================

#[test]
fn test_triangle_covers_center() {
    let mut target = Target::new();
    target.draw(triangle_at(5.0, RED));
    assert_eq!(target.center(), RED);
    assert_eq!(target.stats.triangles_submitted, 1);
    assert_eq!(target.stats.triangles_rasterized, 1);
    assert!(target.stats.pixels_written > 0);
    // Corner outside the triangle stays untouched
    assert_eq!(target.surface.get_pixel(0, 0), Some(Color::BLACK));
}

#[test]
fn test_back_facing_triangle_is_culled() {
    let mut target = Target::new();
    let [a, b, c] = triangle_at(5.0, RED);
    target.draw([a, c, b]);
    assert_eq!(target.center(), Color::BLACK);
    assert_eq!(target.stats.triangles_projected, 1);
    assert_eq!(target.stats.triangles_rasterized, 0);
}

#[test]
fn test_offscreen_triangle_is_rejected() {
    let mut target = Target::new();
    let shifted = triangle_at(5.0, RED).map(|mut v| {
        v.position.x += 50.0;
        v
    });
    target.draw(shifted);
    assert_eq!(target.stats.triangles_rasterized, 0);
    assert_eq!(target.stats.pixels_written, 0);
}

#[test]
fn test_triangle_beyond_far_plane_is_rejected() {
    let mut target = Target::new();
    target.draw(triangle_at(20.0, RED));
    assert_eq!(target.center(), Color::BLACK);
}

#[test]
fn test_nearer_triangle_wins_regardless_of_order() {
    let mut near_first = Target::new();
    near_first.draw(triangle_at(3.0, RED));
    near_first.draw(triangle_at(5.0, BLUE));

    let mut far_first = Target::new();
    far_first.draw(triangle_at(5.0, BLUE));
    far_first.draw(triangle_at(3.0, RED));

    assert_eq!(near_first.center(), RED);
    assert_eq!(far_first.center(), RED);
    assert_eq!(near_first.surface, far_first.surface);
}

#[test]
fn test_translucent_fragments_skip_the_depth_buffer() {
    let green = Color::rgba(0, 255, 0, 128);
    let mut target = Target::new();
    target.draw(triangle_at(5.0, BLUE));
    let depth_after_opaque = target.depth.clone();

    target.draw(triangle_at(1.0, green));
    assert_eq!(target.center(), blend(green, BLUE));
    assert_eq!(target.depth, depth_after_opaque);

    // Nearer than the opaque triangle, farther than the translucent one
    target.draw(triangle_at(3.0, RED));
    assert_eq!(target.center(), Color::rgba(255, 0, 0, 255));
}

#[test]
fn test_translucent_blends_over_everything() {
    let mut target = Target::new();
    target.draw(triangle_at(2.0, RED));
    // Behind the opaque triangle, still blended on top
    target.draw(triangle_at(6.0, Color::rgba(0, 0, 255, 255 / 2)));
    assert_eq!(target.center(), blend(Color::rgba(0, 0, 255, 127), RED));
}

#[test]
fn test_only_first_vertex_color_is_used() {
    let mut target = Target::new();
    let mut triangle = triangle_at(5.0, RED);
    triangle[1].color = BLUE;
    triangle[2].color = BLUE;
    target.draw(triangle);
    assert_eq!(target.center(), RED);
}

#[test]
fn test_clipped_triangle_rasterizes_in_pieces() {
    let mut target = Target::new();
    let triangle = [vertex(-2.0, -2.0, 0.5, RED), vertex(0.0, 2.0, 4.0, RED), vertex(2.0, -2.0, 4.0, RED)];
    target.draw(triangle);
    assert_eq!(target.stats.triangles_submitted, 1);
    assert_eq!(target.stats.triangles_projected, 2);
}
