/// Viewport: camera, projection, scene collection and picking

pub mod collector;
pub mod picker;
mod viewport;

pub use collector::{
    collect_lights, scene_light, DeferredDraw, DrawItem, FrameBatch, GeometryCollector, GeometryPath,
};
pub use picker::{build_pick_ray, pick, PickHit};
pub use viewport::{Viewport, ViewportStats, DEFAULT_BACK, DEFAULT_FIELD, DEFAULT_FRONT};
