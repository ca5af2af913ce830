/// Renderer plugin registry
///
/// Backends register a named factory once (the software backend does it in
/// its `register()`); hosts enumerate the names and create renderers by name.

use std::sync::{Arc, Mutex, OnceLock};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::renderer::{Renderer, RendererConfig};
use crate::engine_info;

/// Factory building a renderer from a configuration
pub type RendererFactory = dyn Fn(&RendererConfig) -> Result<Box<dyn Renderer>> + Send + Sync;

static REGISTRY: OnceLock<Mutex<FxHashMap<String, Arc<RendererFactory>>>> = OnceLock::new();

fn registry() -> &'static Mutex<FxHashMap<String, Arc<RendererFactory>>> {
    REGISTRY.get_or_init(|| Mutex::new(FxHashMap::default()))
}

/// Register (or replace) a renderer plugin
///
/// # Arguments
///
/// * `name` - Plugin name (e.g., "software")
/// * `factory` - Builds a renderer for a configuration
pub fn register_renderer_plugin<F>(name: &str, factory: F) -> Result<()>
where
    F: Fn(&RendererConfig) -> Result<Box<dyn Renderer>> + Send + Sync + 'static,
{
    let mut plugins = registry()
        .lock()
        .map_err(|_| Error::InitializationFailed("renderer registry lock poisoned".to_string()))?;
    if plugins.insert(name.to_string(), Arc::new(factory)).is_some() {
        engine_info!("retained3d::Plugin", "Replaced renderer plugin '{}'", name);
    } else {
        engine_info!("retained3d::Plugin", "Registered renderer plugin '{}'", name);
    }
    Ok(())
}

/// Create a renderer using a registered plugin
pub fn create_renderer(name: &str, config: &RendererConfig) -> Result<Box<dyn Renderer>> {
    // The lock is released before the factory runs
    let factory = registry()
        .lock()
        .map_err(|_| Error::InitializationFailed("renderer registry lock poisoned".to_string()))?
        .get(name)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("renderer plugin '{}'", name)))?;
    factory(config)
}

/// Registered plugin names, sorted
pub fn renderer_plugin_names() -> Vec<String> {
    let mut names: Vec<String> = match registry().lock() {
        Ok(plugins) => plugins.keys().cloned().collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Remove a plugin; returns whether it was registered
pub fn unregister_renderer_plugin(name: &str) -> bool {
    registry()
        .lock()
        .map(|mut plugins| plugins.remove(name).is_some())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "plugin_tests.rs"]
mod tests;
