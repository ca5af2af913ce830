//! Integration tests for the software backend plugin
//!
//! These tests go through the global plugin registry, so they run serially.
//!
//! Run with: cargo test --test software_plugin_tests

use retained_3d_engine::retained3d::render::{
    create_renderer, renderer_plugin_names, unregister_renderer_plugin, RendererConfig,
};
use retained_3d_engine::retained3d::resource::PixelFormat;
use retained_3d_engine::retained3d::Error;
use retained_3d_engine_renderer_software::{register, PLUGIN_NAME, RENDERER_NAME};
use serial_test::serial;

#[test]
#[serial]
fn test_integration_register_and_create() {
    register().unwrap();
    assert!(renderer_plugin_names().contains(&PLUGIN_NAME.to_string()));

    let config = RendererConfig { width: 320, height: 200, pixel_format: PixelFormat::Rgb565, dither: true };
    let renderer = create_renderer(PLUGIN_NAME, &config).unwrap();
    assert_eq!(renderer.name(), RENDERER_NAME);
    assert_eq!((renderer.width(), renderer.height()), (320, 200));
}

#[test]
#[serial]
fn test_integration_register_twice_replaces() {
    register().unwrap();
    register().unwrap();
    let count = renderer_plugin_names().iter().filter(|n| n.as_str() == PLUGIN_NAME).count();
    assert_eq!(count, 1);
}

#[test]
#[serial]
fn test_integration_factory_error_propagates() {
    register().unwrap();
    let config = RendererConfig { width: 0, height: 0, ..Default::default() };
    assert!(matches!(create_renderer(PLUGIN_NAME, &config), Err(Error::InvalidParams(_))));
}

#[test]
#[serial]
fn test_integration_unregister() {
    register().unwrap();
    assert!(unregister_renderer_plugin(PLUGIN_NAME));
    assert!(matches!(
        create_renderer(PLUGIN_NAME, &RendererConfig::default()),
        Err(Error::NotFound(_))
    ));
    assert!(!unregister_renderer_plugin(PLUGIN_NAME));
}
