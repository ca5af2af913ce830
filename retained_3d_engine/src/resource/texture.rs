//! Texture: a versioned, reference-counted pixel surface.
//!
//! Renderer backends cache uploaded copies keyed on the texture's object id
//! and compare `version()` to detect staleness. Every content change must go
//! through `changed()`, `set_surface()` or `with_surface_mut()` so the
//! version moves.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use crate::object::{Object, ObjectBase};
use crate::resource::surface::Surface;

struct TextureData {
    // Declared first: destroy callbacks run before the pixels are freed
    object: ObjectBase,
    surface: Option<Surface>,
    version: u32,
}

/// Shared texture handle; clones refer to the same texture
#[derive(Clone)]
pub struct Texture(Rc<RefCell<TextureData>>);

impl Texture {
    /// Texture without pixels (renderers report it as `NO_TEXTURE_ID`)
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(TextureData {
            object: ObjectBase::new(),
            surface: None,
            version: 0,
        })))
    }

    pub fn from_surface(surface: Surface) -> Self {
        let texture = Self::new();
        texture.0.borrow_mut().surface = Some(surface);
        texture
    }

    /// Monotonic content version
    pub fn version(&self) -> u32 {
        self.0.borrow().version
    }

    /// Signal that the pixels were modified behind the texture's back
    pub fn changed(&self) {
        let mut data = self.0.borrow_mut();
        data.version = data.version.wrapping_add(1);
    }

    pub fn has_surface(&self) -> bool {
        self.0.borrow().surface.is_some()
    }

    /// Replace the pixels
    pub fn set_surface(&self, surface: Option<Surface>) {
        let mut data = self.0.borrow_mut();
        data.surface = surface;
        data.version = data.version.wrapping_add(1);
    }

    /// (width, height), or `None` without a surface
    pub fn size(&self) -> Option<(u32, u32)> {
        self.0.borrow().surface.as_ref().map(|s| (s.width(), s.height()))
    }

    /// Read access to the pixels
    pub fn with_surface<R>(&self, f: impl FnOnce(Option<&Surface>) -> R) -> R {
        f(self.0.borrow().surface.as_ref())
    }

    /// Write access to the pixels; bumps the version when a surface exists
    pub fn with_surface_mut<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> Option<R> {
        let mut data = self.0.borrow_mut();
        let result = data.surface.as_mut().map(f);
        if result.is_some() {
            data.version = data.version.wrapping_add(1);
        }
        result
    }

    pub fn ptr_eq(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Texture {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for Texture {
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R {
        f(&mut self.0.borrow_mut().object)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Texture")
            .field("id", &data.object.id())
            .field("version", &data.version)
            .field("size", &data.surface.as_ref().map(|s| (s.width(), s.height())))
            .finish()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
