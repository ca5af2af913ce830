//! End-to-end tests: scene graph -> viewport -> software rasterizer
//!
//! Scenes are built with the public API, rendered through a real
//! `SoftwareRenderer` and read back with `download()`.
//!
//! Run with: cargo test --test scene_render_integration_tests

use glam::{Mat4, Vec2, Vec3};
use retained_3d_engine::retained3d::math::Vertex;
use retained_3d_engine::retained3d::render::{create_renderer, RendererConfig};
use retained_3d_engine::retained3d::resource::{Color, PixelFormat, ShadingQuality, Surface};
use retained_3d_engine::retained3d::scene::CombineType;
use retained_3d_engine::retained3d::viewport::{collect_lights, GeometryPath};
use retained_3d_engine::retained3d::{Frame, Light, LightType, Mesh, Viewport};
use retained_3d_engine_renderer_software::{blend, register, SoftwareRenderer, PLUGIN_NAME};
use serial_test::serial;

// ============================================================================
// Helper Functions
// ============================================================================

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;
const RED: Color = Color::rgb(255, 0, 0);
const BLUE: Color = Color::rgb(0, 0, 255);

struct TestScene {
    root: Frame,
    camera: Frame,
    mesh: Mesh,
}

/// Front-facing triangle at depth `z`, one flat group of `argb`
fn triangle_mesh(z: f32, argb: u32) -> Mesh {
    let mesh = Mesh::new();
    let g = mesh.add_group(3, 1, 3, &[0, 1, 2]).unwrap();
    let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, z), Vec3::NEG_Z, Vec2::ZERO);
    mesh.set_vertices(g, 0, &[v(-1.0, -1.0), v(0.0, 1.0), v(1.0, -1.0)]).unwrap();
    mesh.set_group_quality(g, ShadingQuality::Flat).unwrap();
    mesh.set_group_color(g, argb).unwrap();
    mesh
}

/// Blue background, white directional light pointing down -Z, camera at the
/// origin and a red triangle at z = 5
fn red_triangle_scene() -> TestScene {
    let root = Frame::new();
    root.set_scene_background_rgb(0.0, 0.0, 1.0);

    let camera = Frame::with_parent(&root).unwrap();

    let sun = Frame::with_parent(&root).unwrap();
    sun.add_transform(CombineType::Replace, Mat4::from_rotation_y(std::f32::consts::PI));
    sun.add_light(&Light::new(LightType::Directional, Color::WHITE));

    let mesh = triangle_mesh(5.0, 0xFFFF0000);
    root.add_visual(mesh.clone());

    TestScene { root, camera, mesh }
}

fn software_viewport() -> Viewport {
    let config = RendererConfig { width: WIDTH, height: HEIGHT, ..Default::default() };
    let renderer = SoftwareRenderer::new(&config).unwrap();
    Viewport::new(Box::new(renderer), WIDTH, HEIGHT).unwrap()
}

/// Clear to the scene background and draw one frame
fn draw(viewport: &mut Viewport, scene: &TestScene) {
    // The first render captures the background used by clear()
    viewport.render(&scene.root).unwrap();
    viewport.clear().unwrap();
    viewport.render(&scene.root).unwrap();
}

fn read_back(viewport: &mut Viewport) -> Surface {
    let mut image = Surface::new(WIDTH, HEIGHT, PixelFormat::Argb8888).unwrap();
    viewport.renderer_mut().download(&mut image).unwrap();
    image
}

fn center(image: &Surface) -> Color {
    image.get_pixel(WIDTH / 2, HEIGHT / 2).unwrap()
}

// ============================================================================
// END-TO-END
// ============================================================================

#[test]
fn test_integration_red_triangle_with_directional_light() {
    let scene = red_triangle_scene();

    let lights = collect_lights(&scene.root);
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].directional, 1.0);
    assert!((lights[0].direction - Vec3::NEG_Z).length() < 1e-5);

    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    draw(&mut viewport, &scene);

    let stats = viewport.stats();
    assert_eq!(stats.lights, 1);
    assert_eq!(stats.meshes_visited, 1);
    assert_eq!(stats.meshes_culled, 0);
    assert_eq!(stats.opaque_draws, 1);
    assert_eq!(viewport.renderer().stats().triangles_submitted, 1);

    let image = read_back(&mut viewport);
    assert_eq!(center(&image), RED);
    assert_eq!(image.get_pixel(0, 0), Some(BLUE));
    assert_eq!(image.get_pixel(WIDTH - 1, HEIGHT - 1), Some(BLUE));
}

#[test]
fn test_integration_retained_path_matches_immediate() {
    let scene = red_triangle_scene();

    let mut immediate = software_viewport();
    immediate.set_camera(Some(scene.camera.clone()));
    draw(&mut immediate, &scene);

    let mut retained = software_viewport();
    retained.set_camera(Some(scene.camera.clone()));
    retained.set_geometry_path(GeometryPath::Retained);
    draw(&mut retained, &scene);

    assert_eq!(read_back(&mut immediate), read_back(&mut retained));
}

#[test]
fn test_integration_mesh_beyond_back_plane_is_culled() {
    let scene = red_triangle_scene();
    scene.root.delete_visual(&scene.mesh.clone().into()).unwrap();
    scene.root.add_visual(triangle_mesh(20.0, 0xFFFF0000));

    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    draw(&mut viewport, &scene);

    assert_eq!(viewport.stats().meshes_culled, 1);
    assert_eq!(center(&read_back(&mut viewport)), BLUE);
}

#[test]
fn test_integration_camera_moves_the_image() {
    let scene = red_triangle_scene();
    // Step right: the triangle leaves the center for the left side
    scene.camera.add_transform(CombineType::Replace, Mat4::from_translation(Vec3::new(1.5, 0.0, 0.0)));

    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    draw(&mut viewport, &scene);

    let image = read_back(&mut viewport);
    assert_eq!(center(&image), BLUE);
    let row = HEIGHT / 2;
    assert!((0..WIDTH / 2).any(|x| image.get_pixel(x, row) == Some(RED)));
}

#[test]
fn test_integration_translucent_group_blends_over_opaque() {
    let scene = red_triangle_scene();
    let glass = triangle_mesh(3.0, 0x8000FF00);
    scene.root.add_visual(glass);

    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    draw(&mut viewport, &scene);

    assert_eq!(viewport.stats().translucent_draws, 1);
    let image = read_back(&mut viewport);
    assert_eq!(center(&image), blend(Color::rgba(0, 255, 0, 128), RED));
}

#[test]
fn test_integration_pick_after_render() {
    let scene = red_triangle_scene();
    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    viewport.render(&scene.root).unwrap();

    let hits = viewport.pick(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0).unwrap();
    assert_eq!(hits.len(), 1);
    assert!((hits[0].distance - 5.0).abs() < 1e-3);
    assert!(viewport.pick(1.0, 1.0).unwrap().is_empty());
}

#[test]
fn test_integration_resize_letterboxes_readback() {
    let scene = red_triangle_scene();
    let mut viewport = software_viewport();
    viewport.set_camera(Some(scene.camera.clone()));
    viewport.resize(WIDTH * 2, HEIGHT * 2).unwrap();
    draw(&mut viewport, &scene);

    // Readback at the virtual size still shows the same picture
    let image = read_back(&mut viewport);
    assert_eq!(center(&image), RED);
    assert_eq!(image.get_pixel(0, 0), Some(BLUE));
}

// ============================================================================
// PLUGIN REGISTRY
// ============================================================================

#[test]
#[serial]
fn test_integration_viewport_over_registered_plugin() {
    register().unwrap();
    let config = RendererConfig { width: WIDTH, height: HEIGHT, ..Default::default() };
    let renderer = create_renderer(PLUGIN_NAME, &config).unwrap();
    let mut viewport = Viewport::new(renderer, WIDTH, HEIGHT).unwrap();

    let scene = red_triangle_scene();
    viewport.set_camera(Some(scene.camera.clone()));
    draw(&mut viewport, &scene);
    assert_eq!(center(&read_back(&mut viewport)), RED);
}
