/*!
# Retained3D Engine - Software Renderer Backend

CPU implementation of the retained3d renderer contract.

Triangles are clipped against the near plane, projected, back-face culled
and scan-converted into an owned backbuffer with a 32-bit float z-buffer.
Textures and mesh groups are cached per object and version, and evicted
through the objects' destroy callbacks.

The backend is registered as the `"software"` plugin and can be selected at
runtime.
*/

mod cache;
mod debug;
mod rasterizer;
mod software_renderer;

pub use cache::{CachedMesh, MeshCache, ResourceCache, TextureCache};
pub use rasterizer::{blend, clip_near, split_edge, Rasterizer, ScreenVertex};
pub use software_renderer::{SoftwareRenderer, RENDERER_NAME};

// Re-export debug utilities
pub use debug::{format_render_stats_report, print_render_stats_report};

use retained_3d_engine::retained3d::render::{register_renderer_plugin, Renderer};
use retained_3d_engine::retained3d::Result;

/// Plugin name used by `register()`
pub const PLUGIN_NAME: &str = "software";

/// Register the software backend with the plugin system
///
/// # Example
///
/// ```no_run
/// use retained_3d_engine::retained3d::render::{create_renderer, RendererConfig};
///
/// retained_3d_engine_renderer_software::register()?;
/// let renderer = create_renderer("software", &RendererConfig::default())?;
/// # Ok::<(), retained_3d_engine::retained3d::Error>(())
/// ```
pub fn register() -> Result<()> {
    register_renderer_plugin(PLUGIN_NAME, |config| {
        let renderer: Box<dyn Renderer> = Box::new(SoftwareRenderer::new(config)?);
        Ok(renderer)
    })
}
