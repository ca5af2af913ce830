/// Renderer trait - the contract every backend implements, plus the data
/// the viewport hands to it

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};
use crate::error::Result;
use crate::math::{Frustum, Rect};
use crate::resource::mesh::Mesh;
use crate::resource::surface::{Color, FColor, PixelFormat, Surface};
use crate::resource::texture::Texture;

/// Returned by `get_texture_id()` when a texture cannot be used
pub const NO_TEXTURE_ID: u32 = 0xFFFF_FFFF;

/// Returned by `get_mesh_id()` when a mesh group cannot be cached
pub const NO_MESH_ID: u32 = 0xFFFF_FFFF;

// ============================================================================
// Scene data
// ============================================================================

/// One light as seen by the renderer, in world space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SceneLight {
    pub color: FColor,
    pub position: Vec3,
    /// 1.0 when `position` is meaningful
    pub positional: f32,
    pub direction: Vec3,
    /// 1.0 when `direction` is meaningful
    pub directional: f32,
}

/// One vertex of the immediate vertex stream, in view space
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PositionColorVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Color,
    pub shininess: f32,
    pub tex_coord: Vec2,
    pub texture_id: u32,
}

/// Per-draw surface appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub color: Color,
    pub shininess: f32,
    pub texture_id: u32,
    /// Use the face normal for every vertex
    pub flat: bool,
}

impl Appearance {
    /// Translucent draws go after all opaque geometry
    pub fn is_translucent(&self) -> bool {
        !self.color.is_opaque()
    }
}

/// Matrices for one retained draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    pub model_view: Mat4,
    pub world: Mat4,
    pub view: Mat4,
    /// Inverse-transpose of the world 3x3
    pub normal: Mat3,
}

/// Letterbox placement of the virtual viewport inside the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self { scale: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

bitflags! {
    /// Capabilities reported by a backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DeviceCaps: u32 {
        const ZBUFFER_32 = 1 << 0;
        const RENDER_16 = 1 << 1;
        const RENDER_24 = 1 << 2;
        const RENDER_32 = 1 << 3;
        const TEXTURE_PERSPECTIVE = 1 << 4;
        const ALPHA_FLAT_BLEND = 1 << 5;
        const FILTER_LINEAR = 1 << 6;
        const HARDWARE = 1 << 7;
    }
}

/// Counters for the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Triangles handed to the rasterizer, before clipping
    pub triangles_submitted: u32,
    /// Triangles that survived near clipping and were projected
    pub triangles_projected: u32,
    /// Projected triangles that survived rejection and culling
    pub triangles_rasterized: u32,
    pub pixels_written: u64,
    /// `submit_draw()` calls
    pub draw_calls: u32,
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Render target width in pixels
    pub width: u32,
    /// Render target height in pixels
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub dither: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            pixel_format: PixelFormat::Argb8888,
            dither: false,
        }
    }
}

// ============================================================================
// Renderer trait
// ============================================================================

/// Backend contract used by the viewport.
///
/// A frame goes `push_lights` → `begin_frame` → `push_vertices` /
/// `submit_draw` for opaque geometry → `enable_transparency` → translucent
/// geometry → `render` → `finalize_frame`. Backends never hold references
/// into the scene graph between calls.
pub trait Renderer {
    /// Replace the light list for the next frame
    fn push_lights(&mut self, lights: &[SceneLight]);

    /// Append view-space triangles (three vertices each) to the frame
    fn push_vertices(&mut self, vertices: &[PositionColorVertex]);

    /// Draw a cached mesh group
    ///
    /// # Arguments
    ///
    /// * `mesh_id` - Id returned by `get_mesh_id()`
    /// * `transforms` - Model-view, world, view and normal matrices
    /// * `appearance` - Color, shininess and texture
    fn submit_draw(&mut self, mesh_id: u32, transforms: &DrawTransforms, appearance: &Appearance);

    /// Set the projection matrix and its clip distances
    fn set_projection(&mut self, projection: &Mat4, front: f32, back: f32);

    /// Frustum extracted from the current view-projection, for backends
    /// that cull on their own
    fn set_frustum(&mut self, _frustum: &Frustum) {}

    /// Resize the render target
    fn resize(&mut self, width: u32, height: u32, transform: ViewportTransform) -> Result<()>;

    /// Cache id for a texture, or `NO_TEXTURE_ID`.
    ///
    /// Repeated calls for an unchanged texture return the same id without
    /// re-reading its pixels.
    fn get_texture_id(&mut self, texture: &Texture, is_ui: bool, scale_x: f32, scale_y: f32) -> u32;

    /// Cache id for one mesh group, or `NO_MESH_ID`
    fn get_mesh_id(&mut self, mesh: &Mesh, group: usize) -> u32;

    fn begin_frame(&mut self) -> Result<()>;

    /// Everything submitted from now until `finalize_frame()` is translucent
    fn enable_transparency(&mut self);

    /// Draw everything pushed since `begin_frame()`
    fn render(&mut self) -> Result<()>;

    fn finalize_frame(&mut self) -> Result<()>;

    /// Fill the render target with an opaque color (normalized components)
    fn clear(&mut self, r: f32, g: f32, b: f32);

    /// Present the finished frame
    fn flip(&mut self);

    /// Blit a texture region (or a solid color for `NO_TEXTURE_ID`) in
    /// screen space
    fn draw_2d_image(&mut self, texture_id: u32, src: &Rect, dst: &Rect, color: FColor);

    /// Copy the render target into `target`, scaling and converting as needed
    fn download(&mut self, target: &mut Surface) -> Result<()>;

    fn set_dither(&mut self, dither: bool);

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Human-readable backend name
    fn name(&self) -> &str;

    fn caps(&self) -> DeviceCaps;

    /// Counters for the last rendered frame
    fn stats(&self) -> RendererStats;
}
