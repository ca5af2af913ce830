//! Shared scene resources
//!
//! Textures, materials, lights and meshes are cheap-to-clone handles. Cloning
//! shares the underlying object; `ptr_eq()` (and `==`) compares identity.

pub mod surface;
pub mod texture;
pub mod material;
pub mod light;
pub mod mesh;

pub use surface::{Color, FColor, PixelFormat, Surface};
pub use texture::Texture;
pub use material::Material;
pub use light::{Light, LightType};
pub use mesh::{
    GroupInfo, Mesh, MeshGroup, ShadingQuality,
    INVALID_GROUP_COLOR, MAPPING_PERSPECTIVE_CORRECT,
};
