//! Material: surface response parameters shared by mesh groups.
//!
//! Only the specular power reaches the renderers; the emissive and specular
//! colors are stored for hosts that query them back.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use crate::object::{Object, ObjectBase};
use crate::resource::surface::FColor;

struct MaterialData {
    object: ObjectBase,
    power: f32,
    emissive: FColor,
    specular: FColor,
}

/// Shared material handle
#[derive(Clone)]
pub struct Material(Rc<RefCell<MaterialData>>);

impl Material {
    pub fn new(power: f32) -> Self {
        Self(Rc::new(RefCell::new(MaterialData {
            object: ObjectBase::new(),
            power,
            emissive: FColor::default(),
            specular: FColor::new(1.0, 1.0, 1.0, 1.0),
        })))
    }

    /// Specular exponent ("shininess")
    pub fn power(&self) -> f32 {
        self.0.borrow().power
    }

    pub fn set_power(&self, power: f32) {
        self.0.borrow_mut().power = power;
    }

    pub fn emissive(&self) -> FColor {
        self.0.borrow().emissive
    }

    pub fn set_emissive(&self, r: f32, g: f32, b: f32) {
        self.0.borrow_mut().emissive = FColor::new(r, g, b, 1.0);
    }

    pub fn specular(&self) -> FColor {
        self.0.borrow().specular
    }

    pub fn set_specular(&self, r: f32, g: f32, b: f32) {
        self.0.borrow_mut().specular = FColor::new(r, g, b, 1.0);
    }

    pub fn ptr_eq(&self, other: &Material) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Object for Material {
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R {
        f(&mut self.0.borrow_mut().object)
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Material")
            .field("id", &data.object.id())
            .field("power", &data.power)
            .finish()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
