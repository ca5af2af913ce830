/*!
# Retained3D Engine

Retained-mode 3D scene graph with a pluggable renderer contract.

The host builds a tree of frames, attaches meshes and lights to them, and
calls `Viewport::render()` once per tick. The viewport walks the tree, culls
against the camera frustum and hands lights and view-space geometry to a
backend implementing `Renderer`. Backends (the software rasterizer, GPU
backends) register themselves by name in the plugin registry.

## Architecture

- **Frame**: scene-graph node with a local transform, children, visuals and lights
- **Mesh**: groups of faces sharing a color, texture, material and shading quality
- **Light / Texture / Material**: shared resources attached to frames and groups
- **Viewport**: camera, projection, collection, picking and coordinate mapping
- **Renderer**: backend contract plus the data the viewport hands to it

All scene objects are single-threaded reference-counted handles; cloning a
handle shares the object.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod object;
pub mod renderer;
pub mod resource;
pub mod scene;
pub mod utils;
pub mod viewport;

// Main retained3d namespace module
pub mod retained3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (logger)
    pub use crate::engine::Engine;

    // Object base shared by every scene object
    pub use crate::object::{DestroyCallback, DestroyCallbackKey, Object, ObjectBase, ObjectId};

    // Most used handles
    pub use crate::renderer::Renderer;
    pub use crate::resource::{Light, LightType, Material, Mesh, Texture};
    pub use crate::scene::{CombineType, Frame, Visual};
    pub use crate::viewport::{PickHit, Viewport};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Render sub-module with the backend contract and plugin registry
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Viewport sub-module
    pub mod viewport {
        pub use crate::viewport::*;
    }

    // Utility sub-module
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
