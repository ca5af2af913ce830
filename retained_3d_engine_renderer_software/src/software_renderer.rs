/// SoftwareRenderer - CPU implementation of the renderer contract
///
/// Draws into an owned backbuffer `Surface` with a float z-buffer. Geometry
/// arrives either as view-space triangles (`push_vertices()`) or as cached
/// mesh groups expanded on `submit_draw()`; both end up in one vertex stream
/// that `render()` rasterizes in submission order.

use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat3, Mat4, Vec3};
use retained_3d_engine::retained3d::math::{self, Rect};
use retained_3d_engine::retained3d::render::{
    Appearance, DeviceCaps, DrawTransforms, PositionColorVertex, Renderer, RendererConfig, RendererStats,
    SceneLight, ViewportTransform, NO_MESH_ID, NO_TEXTURE_ID,
};
use retained_3d_engine::retained3d::resource::{Color, FColor, Mesh, PixelFormat, Surface, Texture};
use retained_3d_engine::retained3d::{Object, Result};
use retained_3d_engine::{engine_bail, engine_debug, engine_info, engine_trace};
use crate::cache::{self, CachedMesh, MeshCache, TextureCache};
use crate::rasterizer::{self, Rasterizer};

const SOURCE: &str = "retained3d::software::Renderer";

/// Human-readable backend name
pub const RENDERER_NAME: &str = "Software Renderer";

pub struct SoftwareRenderer {
    backbuffer: Surface,
    zbuffer: Vec<f32>,
    rasterizer: Rasterizer,
    back: f32,
    lights: Vec<SceneLight>,
    vertices: Vec<PositionColorVertex>,
    transform: ViewportTransform,
    dither: bool,
    textures: Rc<RefCell<TextureCache>>,
    meshes: Rc<RefCell<MeshCache>>,
    stats: RendererStats,
    presented_frames: u64,
}

impl SoftwareRenderer {
    /// Create a renderer drawing into a `config.width x config.height` backbuffer
    ///
    /// # Errors
    ///
    /// `InvalidParams` for an empty size.
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let backbuffer = Surface::new(config.width, config.height, config.pixel_format)?;
        engine_info!(
            SOURCE,
            "Created {}x{} {:?} backbuffer",
            config.width,
            config.height,
            config.pixel_format
        );
        Ok(Self {
            zbuffer: vec![f32::INFINITY; config.width as usize * config.height as usize],
            backbuffer,
            rasterizer: Rasterizer::new(Mat4::IDENTITY, 1.0),
            back: 10.0,
            lights: Vec::new(),
            vertices: Vec::new(),
            transform: ViewportTransform::default(),
            dither: config.dither,
            textures: cache::shared(),
            meshes: cache::shared(),
            stats: RendererStats::default(),
            presented_frames: 0,
        })
    }

    /// The image drawn so far
    pub fn backbuffer(&self) -> &Surface {
        &self.backbuffer
    }

    /// Lights from the last `push_lights()`
    pub fn lights(&self) -> &[SceneLight] {
        &self.lights
    }

    /// Vertices waiting for the next `render()`
    pub fn pending_vertices(&self) -> &[PositionColorVertex] {
        &self.vertices
    }

    pub fn viewport_transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn dither(&self) -> bool {
        self.dither
    }

    pub fn back(&self) -> f32 {
        self.back
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// Live texture cache entries
    pub fn cached_texture_count(&self) -> usize {
        self.textures.borrow().len()
    }

    /// Live mesh cache entries
    pub fn cached_mesh_count(&self) -> usize {
        self.meshes.borrow().len()
    }

    /// Texture pixel reads since creation
    pub fn texture_uploads(&self) -> u64 {
        self.textures.borrow().uploads()
    }

    /// Mesh group rebuilds since creation
    pub fn mesh_uploads(&self) -> u64 {
        self.meshes.borrow().uploads()
    }

    // ===== 2D =====

    /// Window-space pixel rect covered by `dst` (virtual coordinates)
    fn window_rect(&self, dst: &Rect) -> Rect {
        let quad = math::create_2d_transform_matrix(dst, self.transform.scale, self.transform.offset_x, self.transform.offset_y);
        let (w, h) = (self.backbuffer.width() as f32, self.backbuffer.height() as f32);
        let to_ndc = math::create_orthographic_projection(w, h) * quad;
        let corner = |u: f32, v: f32| {
            let ndc = to_ndc.project_point3(Vec3::new(u, v, 0.0));
            (math::from_ndc(ndc.x, w).round() as i32, math::from_ndc(-ndc.y, h).round() as i32)
        };
        let (x0, y0) = corner(0.0, 0.0);
        let (x1, y1) = corner(1.0, 1.0);
        Rect::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    fn write_2d(&mut self, x: u32, y: u32, color: Color) {
        if color.a == 0 {
            return;
        }
        let format = self.backbuffer.format();
        let out = if color.is_opaque() {
            color
        } else {
            rasterizer::blend(color, format.unpack(self.backbuffer.read_raw(x, y)))
        };
        self.backbuffer.write_raw(x, y, format.pack(out));
        self.stats.pixels_written += 1;
    }
}

/// Modulate a texel by a normalized tint
fn tint(texel: Color, color: &FColor) -> Color {
    let scale = |c: u8, f: f32| (c as f32 * f.clamp(0.0, 1.0)) as u8;
    Color::rgba(scale(texel.r, color.r), scale(texel.g, color.g), scale(texel.b, color.b), scale(texel.a, color.a))
}

/// View-space triangles of a cached group under `transforms`
fn expand_mesh(mesh: &CachedMesh, transforms: &DrawTransforms, appearance: &Appearance, out: &mut Vec<PositionColorVertex>) {
    let view_rotation = Mat3::from_mat4(transforms.view);
    for tri in mesh.indices.chunks_exact(3) {
        let fetch = |i: u32| mesh.vertices.get(i as usize);
        let (Some(a), Some(b), Some(c)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
            continue;
        };
        for v in [a, b, c] {
            out.push(PositionColorVertex {
                position: transforms.model_view.transform_point3(v.position),
                normal: (view_rotation * (transforms.normal * v.normal)).normalize_or_zero(),
                color: appearance.color,
                shininess: appearance.shininess,
                tex_coord: v.tex_coord,
                texture_id: appearance.texture_id,
            });
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn push_lights(&mut self, lights: &[SceneLight]) {
        self.lights.clear();
        self.lights.extend_from_slice(lights);
    }

    fn push_vertices(&mut self, vertices: &[PositionColorVertex]) {
        self.vertices.extend_from_slice(vertices);
    }

    fn submit_draw(&mut self, mesh_id: u32, transforms: &DrawTransforms, appearance: &Appearance) {
        self.stats.draw_calls += 1;
        if mesh_id == NO_MESH_ID {
            return;
        }
        let meshes = self.meshes.borrow();
        match meshes.get(mesh_id) {
            Some(mesh) => expand_mesh(mesh, transforms, appearance, &mut self.vertices),
            None => engine_trace!(SOURCE, "Draw of evicted mesh id {} skipped", mesh_id),
        }
    }

    fn set_projection(&mut self, projection: &Mat4, front: f32, back: f32) {
        self.rasterizer = Rasterizer::new(*projection, front);
        self.back = back;
    }

    fn resize(&mut self, width: u32, height: u32, transform: ViewportTransform) -> Result<()> {
        let format = self.backbuffer.format();
        self.backbuffer = Surface::new(width, height, format)?;
        self.zbuffer = vec![f32::INFINITY; width as usize * height as usize];
        self.transform = transform;
        engine_debug!(
            SOURCE,
            "Resized to {}x{} (scale {}, offset {}, {})",
            width,
            height,
            transform.scale,
            transform.offset_x,
            transform.offset_y
        );
        Ok(())
    }

    fn get_texture_id(&mut self, texture: &Texture, is_ui: bool, _scale_x: f32, _scale_y: f32) -> u32 {
        let key = texture.id();
        let version = texture.version();
        let cached = self.textures.borrow().lookup(&key);
        if let Some((id, cached_version)) = cached {
            if cached_version == version {
                return id;
            }
        }

        // Keep a 32-bit copy so later edits to the texture need a version bump to show
        let copy = texture.with_surface(|surface| {
            let surface = surface?;
            let mut copy = Surface::new(surface.width(), surface.height(), PixelFormat::Argb8888).ok()?;
            copy.blit_scaled(surface);
            Some(copy)
        });
        let Some(copy) = copy else {
            if cached.is_some() {
                self.textures.borrow_mut().evict(|k| *k == key);
            }
            return NO_TEXTURE_ID;
        };

        let id = self.textures.borrow_mut().insert(key, version, copy);
        if self.textures.borrow_mut().watch(key) {
            let weak = Rc::downgrade(&self.textures);
            texture.add_destroy_callback(move |destroyed| cache::evict_on_destroy(&weak, |k| *k == destroyed));
        }
        engine_trace!(SOURCE, "Texture {} v{} cached in slot {} (ui: {})", key, version, id, is_ui);
        id
    }

    fn get_mesh_id(&mut self, mesh: &Mesh, group: usize) -> u32 {
        let key = (mesh.id(), group);
        let version = mesh.version();
        let cached = self.meshes.borrow().lookup(&key);
        if let Some((id, cached_version)) = cached {
            if cached_version == version {
                return id;
            }
        }

        let Some(entry) = mesh.group(group).map(|g| {
            let (vertices, indices) = g.render_geometry();
            CachedMesh {
                vertices: vertices.to_vec(),
                indices: indices.to_vec(),
                flat: g.quality().is_flat(),
            }
        }) else {
            return NO_MESH_ID;
        };

        let id = self.meshes.borrow_mut().insert(key, version, entry);
        if self.meshes.borrow_mut().watch(key) {
            let weak = Rc::downgrade(&self.meshes);
            mesh.add_destroy_callback(move |_| cache::evict_on_destroy(&weak, |k| *k == key));
        }
        engine_trace!(SOURCE, "Mesh {} group {} v{} cached in slot {}", key.0, group, version, id);
        id
    }

    fn begin_frame(&mut self) -> Result<()> {
        self.stats = RendererStats::default();
        Ok(())
    }

    // Translucency is decided per fragment from the vertex alpha, so the
    // stream needs no split
    fn enable_transparency(&mut self) {}

    fn render(&mut self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            let count = self.vertices.len();
            self.vertices.clear();
            engine_bail!(SOURCE, "Vertex stream holds {} vertices, not whole triangles", count);
        }
        self.zbuffer.fill(f32::INFINITY);
        let mut stats = self.stats;
        for tri in self.vertices.chunks_exact(3) {
            self.rasterizer
                .draw_triangle([tri[0], tri[1], tri[2]], &mut self.backbuffer, &mut self.zbuffer, &mut stats);
        }
        self.stats = stats;
        self.vertices.clear();
        Ok(())
    }

    fn finalize_frame(&mut self) -> Result<()> {
        engine_trace!(
            SOURCE,
            "Frame done: {} triangles in, {} rasterized, {} pixels",
            self.stats.triangles_submitted,
            self.stats.triangles_rasterized,
            self.stats.pixels_written
        );
        Ok(())
    }

    fn clear(&mut self, r: f32, g: f32, b: f32) {
        self.backbuffer.fill(Color::from_unit(r, g, b, 1.0));
        self.zbuffer.fill(f32::INFINITY);
    }

    fn flip(&mut self) {
        self.presented_frames += 1;
    }

    fn draw_2d_image(&mut self, texture_id: u32, src: &Rect, dst: &Rect, color: FColor) {
        let full = self.window_rect(dst);
        let Some(area) = full.intersect(&self.backbuffer.bounds()) else {
            return;
        };

        if texture_id == NO_TEXTURE_ID {
            let solid = Color::from_unit(color.r, color.g, color.b, color.a);
            for y in area.y..area.bottom() {
                for x in area.x..area.right() {
                    self.write_2d(x as u32, y as u32, solid);
                }
            }
            return;
        }

        if src.is_empty() {
            return;
        }
        let cache = Rc::clone(&self.textures);
        let textures = cache.borrow();
        let Some(texture) = textures.get(texture_id) else {
            engine_trace!(SOURCE, "2D draw of unknown texture id {} skipped", texture_id);
            return;
        };
        let max_x = texture.width() as i32 - 1;
        let max_y = texture.height() as i32 - 1;
        for y in area.y..area.bottom() {
            let v = (y - full.y) as f32 + 0.5;
            let ty = (src.y + (v * src.h as f32 / full.h as f32) as i32).clamp(0, max_y);
            for x in area.x..area.right() {
                let u = (x - full.x) as f32 + 0.5;
                let tx = (src.x + (u * src.w as f32 / full.w as f32) as i32).clamp(0, max_x);
                let texel = texture.format().unpack(texture.read_raw(tx as u32, ty as u32));
                self.write_2d(x as u32, y as u32, tint(texel, &color));
            }
        }
    }

    fn download(&mut self, target: &mut Surface) -> Result<()> {
        // Letterboxed region holding the virtual viewport
        let region = Rect::new(
            self.transform.offset_x as i32,
            self.transform.offset_y as i32,
            (target.width() as f32 * self.transform.scale) as i32,
            (target.height() as f32 * self.transform.scale) as i32,
        );
        let Some(region) = region.intersect(&self.backbuffer.bounds()) else {
            engine_bail!(SOURCE, "Download region {:?} lies outside the backbuffer", region);
        };
        let source = &self.backbuffer;
        for y in 0..target.height() {
            let sy = region.y as u32 + (y as u64 * region.h as u64 / target.height() as u64) as u32;
            for x in 0..target.width() {
                let sx = region.x as u32 + (x as u64 * region.w as u64 / target.width() as u64) as u32;
                let color = source.format().unpack(source.read_raw(sx, sy));
                target.set_pixel(x, y, color);
            }
        }
        Ok(())
    }

    fn set_dither(&mut self, dither: bool) {
        self.dither = dither;
    }

    fn width(&self) -> u32 {
        self.backbuffer.width()
    }

    fn height(&self) -> u32 {
        self.backbuffer.height()
    }

    fn name(&self) -> &str {
        RENDERER_NAME
    }

    fn caps(&self) -> DeviceCaps {
        DeviceCaps::ZBUFFER_32
            | DeviceCaps::RENDER_16
            | DeviceCaps::RENDER_24
            | DeviceCaps::RENDER_32
            | DeviceCaps::TEXTURE_PERSPECTIVE
            | DeviceCaps::ALPHA_FLAT_BLEND
            | DeviceCaps::FILTER_LINEAR
    }

    fn stats(&self) -> RendererStats {
        self.stats
    }
}

#[cfg(test)]
#[path = "software_renderer_tests.rs"]
mod tests;
