/// Viewport: renders a frame tree through a camera into one renderer.
///
/// Each `render()` runs the whole pipeline synchronously: camera and view
/// matrices, light collection, frustum extraction, geometry collection,
/// then the renderer's draw. Nothing is retained between frames except the
/// background color and a weak reference to the last root (for picking).

use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::math::{self, PerspectiveProjection};
use crate::object::Object;
use crate::renderer::{Renderer, ViewportTransform};
use crate::resource::surface::Color;
use crate::scene::{Frame, WeakFrame};
use crate::viewport::collector::{collect_lights, DrawItem, GeometryCollector, GeometryPath};
use crate::viewport::picker::{self, PickHit};
use crate::{engine_debug, engine_err, engine_invalid_params, engine_warn_once};

const SOURCE: &str = "retained3d::Viewport";

/// Default near clip distance
pub const DEFAULT_FRONT: f32 = 1.0;
/// Default far clip distance
pub const DEFAULT_BACK: f32 = 10.0;
/// Default half-width of the view window at the near plane
pub const DEFAULT_FIELD: f32 = 0.5;

/// Counters from the last `render()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportStats {
    pub lights: u32,
    pub meshes_visited: u32,
    pub meshes_culled: u32,
    pub opaque_draws: u32,
    pub translucent_draws: u32,
}

pub struct Viewport {
    renderer: Box<dyn Renderer>,
    /// Virtual (authored) size in pixels
    width: u32,
    height: u32,
    camera: Option<Frame>,
    front: f32,
    back: f32,
    field: f32,
    projection: PerspectiveProjection,
    view: Mat4,
    view_projection: Mat4,
    /// Captured from the root at each `render()`
    background: Color,
    last_root: WeakFrame,
    geometry_path: GeometryPath,
    stats: ViewportStats,
}

impl Viewport {
    /// Create a viewport of `width x height` virtual pixels drawing into `renderer`.
    ///
    /// The initial projection (front 1, back 10, field 0.5) is pushed to the
    /// renderer immediately.
    pub fn new(renderer: Box<dyn Renderer>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(engine_invalid_params!(SOURCE, "Viewport size {}x{} is empty", width, height));
        }
        let mut viewport = Self {
            renderer,
            width,
            height,
            camera: None,
            front: DEFAULT_FRONT,
            back: DEFAULT_BACK,
            field: DEFAULT_FIELD,
            projection: PerspectiveProjection::new(DEFAULT_FRONT, DEFAULT_BACK, DEFAULT_FIELD, 1.0, 1.0),
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            background: Color::BLACK,
            last_root: WeakFrame::default(),
            geometry_path: GeometryPath::default(),
            stats: ViewportStats::default(),
        };
        viewport.update_projection();
        Ok(viewport)
    }

    // ===== PROJECTION =====

    fn update_projection(&mut self) {
        let virtual_aspect = self.width as f32 / self.height as f32;
        let window_aspect = self.renderer.width().max(1) as f32 / self.renderer.height().max(1) as f32;
        self.projection = PerspectiveProjection::new(self.front, self.back, self.field, virtual_aspect, window_aspect);
        self.view_projection = self.projection.projection * self.view;
        self.renderer.set_projection(&self.projection.projection, self.front, self.back);
    }

    pub fn set_front(&mut self, front: f32) -> Result<()> {
        if !(front > 0.0 && front < self.back) {
            return Err(engine_invalid_params!(
                SOURCE, "Front {} must be positive and in front of back {}", front, self.back
            ));
        }
        self.front = front;
        self.update_projection();
        Ok(())
    }

    pub fn set_back(&mut self, back: f32) -> Result<()> {
        if !(back > self.front) {
            return Err(engine_invalid_params!(SOURCE, "Back {} must be beyond front {}", back, self.front));
        }
        self.back = back;
        self.update_projection();
        Ok(())
    }

    pub fn set_field(&mut self, field: f32) -> Result<()> {
        if !(field > 0.0) {
            return Err(engine_invalid_params!(SOURCE, "Field {} must be positive", field));
        }
        self.field = field;
        self.update_projection();
        Ok(())
    }

    pub fn front(&self) -> f32 {
        self.front
    }

    pub fn back(&self) -> f32 {
        self.back
    }

    pub fn field(&self) -> f32 {
        self.field
    }

    pub fn projection(&self) -> &PerspectiveProjection {
        &self.projection
    }

    /// View matrix from the last `render()` or `set_camera()`
    pub fn view(&self) -> Mat4 {
        self.view
    }

    // ===== CAMERA =====

    pub fn set_camera(&mut self, camera: Option<Frame>) {
        if let Some(frame) = &camera {
            self.update_view(frame);
        }
        self.camera = camera;
    }

    pub fn camera(&self) -> Option<Frame> {
        self.camera.clone()
    }

    fn update_view(&mut self, camera: &Frame) {
        self.view = math::invert_orthogonal(&camera.world_matrix());
        self.view_projection = self.projection.projection * self.view;
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        self.renderer.as_mut()
    }

    pub fn geometry_path(&self) -> GeometryPath {
        self.geometry_path
    }

    /// Choose between the immediate vertex stream and cached mesh draws
    pub fn set_geometry_path(&mut self, path: GeometryPath) {
        self.geometry_path = path;
    }

    /// Background captured from the last rendered root
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn stats(&self) -> ViewportStats {
        self.stats
    }

    // ===== RENDERING =====

    /// Render the tree under `root` through the current camera.
    ///
    /// Lights are pushed before `begin_frame()`; opaque geometry precedes
    /// `enable_transparency()`, which is always called, followed by
    /// translucent groups far-to-near.
    pub fn render(&mut self, root: &Frame) -> Result<()> {
        let Some(camera) = self.camera.clone() else {
            return Err(engine_invalid_params!(SOURCE, "Render called without a camera"));
        };

        self.background = root.scene_background();
        self.last_root = root.downgrade();
        self.update_view(&camera);

        let lights = collect_lights(root);
        self.renderer.push_lights(&lights);
        self.renderer.begin_frame()?;

        let batch = GeometryCollector::new(self.renderer.as_mut(), self.view, self.view_projection, self.geometry_path)
            .collect(root);
        self.renderer.set_frustum(&batch.frustum);

        for item in &batch.opaque {
            self.submit(item);
        }
        self.renderer.enable_transparency();
        for deferred in &batch.translucent {
            self.submit(&deferred.item);
        }

        self.renderer.render()?;
        self.renderer.finalize_frame()?;

        self.stats = ViewportStats {
            lights: lights.len() as u32,
            meshes_visited: batch.meshes_visited,
            meshes_culled: batch.meshes_culled,
            opaque_draws: batch.opaque.len() as u32,
            translucent_draws: batch.translucent.len() as u32,
        };
        engine_debug!(
            SOURCE,
            "Rendered frame {}: {} lights, {} meshes ({} culled), {} opaque + {} translucent draws",
            root.id(),
            self.stats.lights,
            self.stats.meshes_visited,
            self.stats.meshes_culled,
            self.stats.opaque_draws,
            self.stats.translucent_draws
        );
        Ok(())
    }

    fn submit(&mut self, item: &DrawItem) {
        match item {
            DrawItem::Vertices(vertices) => self.renderer.push_vertices(vertices),
            DrawItem::Mesh { mesh_id, transforms, appearance } => {
                self.renderer.submit_draw(*mesh_id, transforms, appearance)
            }
        }
    }

    /// Fill the render target with the last rendered root's background
    pub fn clear(&mut self) -> Result<()> {
        let bg = self.background;
        self.renderer.clear(bg.r as f32 / 255.0, bg.g as f32 / 255.0, bg.b as f32 / 255.0);
        Ok(())
    }

    /// Partial updates are not supported; the whole target is redrawn by `render()`
    pub fn force_update(&mut self, _x: i32, _y: i32, _w: i32, _h: i32) -> Result<()> {
        engine_warn_once!(SOURCE, "force_update is not supported, ignoring");
        Ok(())
    }

    /// Letterbox the virtual viewport into a `window_width x window_height` target
    pub fn resize(&mut self, window_width: u32, window_height: u32) -> Result<()> {
        if window_width == 0 || window_height == 0 {
            return Err(engine_invalid_params!(SOURCE, "Window size {}x{} is empty", window_width, window_height));
        }
        let scale = (window_width as f32 / self.width as f32).min(window_height as f32 / self.height as f32);
        let transform = ViewportTransform {
            scale,
            offset_x: (window_width as f32 - self.width as f32 * scale) * 0.5,
            offset_y: (window_height as f32 - self.height as f32 * scale) * 0.5,
        };
        self.renderer.resize(window_width, window_height, transform)?;
        self.update_projection();
        Ok(())
    }

    // ===== PICKING =====

    /// Meshes under viewport pixel `(x, y)` in the last rendered scene, nearest first
    pub fn pick(&self, x: f32, y: f32) -> Result<Vec<PickHit>> {
        let Some(camera) = &self.camera else {
            return Err(engine_invalid_params!(SOURCE, "Pick called without a camera"));
        };
        let Some(root) = self.last_root.upgrade() else {
            return Err(engine_err!(SOURCE, "Pick called before a scene was rendered"));
        };
        let ray = picker::build_pick_ray(x, y, self.width, self.height, self.front, self.field, &camera.world_matrix());
        Ok(picker::pick(&root, &ray))
    }

    // ===== COORDINATE MAPPING =====

    /// World point to homogeneous screen coordinates.
    ///
    /// Returns `(sx * z, sy * w, z, w)` where `(sx, sy)` is the pixel position
    /// and `(z, w)` the clip-space depth and w. `inverse_transform()` undoes it.
    pub fn transform(&self, world: Vec3) -> Vec4 {
        let clip = self.projection.projection * (self.view * world.extend(1.0));
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let sx = math::from_ndc(ndc_x, self.width as f32) * clip.z;
        let sy = math::from_ndc(-ndc_y, self.height as f32) * clip.w;
        Vec4::new(sx, sy, clip.z, clip.w)
    }

    /// Homogeneous screen coordinates (as produced by `transform()`) to a world point
    pub fn inverse_transform(&self, screen: Vec4) -> Vec3 {
        let sx = screen.x / screen.z;
        let sy = screen.y / screen.w;
        let ndc_x = sx / self.width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - sy / self.height as f32 * 2.0;

        let clip = Vec4::new(ndc_x * screen.w, ndc_y * screen.w, screen.z, screen.w);
        let view = self.projection.inverse * clip;
        let world = math::invert_orthogonal(&self.view) * view;
        if world.w != 0.0 {
            world.truncate() / world.w
        } else {
            world.truncate()
        }
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
