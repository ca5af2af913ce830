/// Renderer module - the backend contract and the plugin registry

pub mod renderer;
pub mod plugin;

#[cfg(test)]
pub mod mock_renderer;

pub use renderer::*;
pub use plugin::{
    create_renderer, register_renderer_plugin, renderer_plugin_names, unregister_renderer_plugin,
    RendererFactory,
};
