//! Light: a colored light descriptor.
//!
//! A light has no position or direction of its own: both come from the world
//! transform of each frame it is attached to, at render time.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use crate::object::{Object, ObjectBase};
use crate::resource::surface::Color;

/// Light kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Uniform color, no position or direction
    Ambient,
    /// Positioned, radiates in all directions
    Point,
    /// Positioned and oriented
    Spot,
    /// Positioned, treated as parallel rays
    ParallelPoint,
    /// Oriented only (the frame's +Z axis)
    Directional,
}

impl LightType {
    /// Position is taken from the frame's world translation
    pub fn is_positional(self) -> bool {
        matches!(self, LightType::Point | LightType::Spot | LightType::ParallelPoint)
    }

    /// Direction is taken from the frame's world +Z axis
    pub fn is_directional(self) -> bool {
        matches!(self, LightType::Directional | LightType::Spot)
    }
}

struct LightData {
    object: ObjectBase,
    light_type: LightType,
    color: Color,
}

/// Shared light handle
#[derive(Clone)]
pub struct Light(Rc<RefCell<LightData>>);

impl Light {
    pub fn new(light_type: LightType, color: Color) -> Self {
        Self(Rc::new(RefCell::new(LightData {
            object: ObjectBase::new(),
            light_type,
            color,
        })))
    }

    /// Light from normalized RGB components (alpha 255)
    pub fn new_rgb(light_type: LightType, r: f32, g: f32, b: f32) -> Self {
        Self::new(light_type, Color::from_unit(r, g, b, 1.0))
    }

    pub fn light_type(&self) -> LightType {
        self.0.borrow().light_type
    }

    pub fn set_type(&self, light_type: LightType) {
        self.0.borrow_mut().light_type = light_type;
    }

    pub fn color(&self) -> Color {
        self.0.borrow().color
    }

    pub fn set_color(&self, color: Color) {
        self.0.borrow_mut().color = color;
    }

    pub fn set_color_rgb(&self, r: f32, g: f32, b: f32) {
        self.set_color(Color::from_unit(r, g, b, 1.0));
    }

    pub fn ptr_eq(&self, other: &Light) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Object for Light {
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R {
        f(&mut self.0.borrow_mut().object)
    }
}

impl PartialEq for Light {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Light")
            .field("id", &data.object.id())
            .field("type", &data.light_type)
            .field("color", &data.color)
            .finish()
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
