//! Frame: a node of the scene graph.
//!
//! A frame owns its children, shares its visuals and lights, and holds a
//! non-owning back-reference to its parent. World matrices are never cached:
//! `world_matrix()` walks the parent chain on every call.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use glam::{Mat4, Vec3};
use crate::engine_invalid_params;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectBase};
use crate::resource::light::Light;
use crate::resource::mesh::Mesh;
use crate::resource::surface::Color;
use crate::resource::texture::Texture;

/// How `add_transform()` combines a matrix with the current local transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineType {
    /// Discard the current transform
    Replace,
    /// Apply the new matrix before the current transform
    Before,
    /// Apply the new matrix after the current transform
    After,
}

/// Anything that can be attached to a frame as visible content
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Mesh(Mesh),
    /// A frame used as a visual: its content is drawn with the host's transform
    Frame(Frame),
}

impl From<Mesh> for Visual {
    fn from(mesh: Mesh) -> Self {
        Visual::Mesh(mesh)
    }
}

impl From<Frame> for Visual {
    fn from(frame: Frame) -> Self {
        Visual::Frame(frame)
    }
}

impl Visual {
    fn ptr_eq(&self, other: &Visual) -> bool {
        match (self, other) {
            (Visual::Mesh(a), Visual::Mesh(b)) => a.ptr_eq(b),
            (Visual::Frame(a), Visual::Frame(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// ============================================================================
// FRAME DATA
// ============================================================================

struct FrameData {
    object: ObjectBase,
    parent: Weak<RefCell<FrameData>>,
    children: Vec<Frame>,
    visuals: Vec<Visual>,
    lights: Vec<Light>,
    /// Local-to-parent transform
    transform: Mat4,
    background: Color,
    color: Color,
    texture: Option<Texture>,
}

/// Shared frame handle
#[derive(Clone)]
pub struct Frame(Rc<RefCell<FrameData>>);

impl Frame {
    /// Root frame (no parent, identity transform)
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(FrameData {
            object: ObjectBase::new(),
            parent: Weak::new(),
            children: Vec::new(),
            visuals: Vec::new(),
            lights: Vec::new(),
            transform: Mat4::IDENTITY,
            background: Color::BLACK,
            color: Color::WHITE,
            texture: None,
        })))
    }

    /// New frame attached under `parent`
    pub fn with_parent(parent: &Frame) -> Result<Self> {
        let frame = Self::new();
        parent.add_child(&frame)?;
        Ok(frame)
    }

    pub fn ptr_eq(&self, other: &Frame) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Non-owning reference to this frame
    pub fn downgrade(&self) -> WeakFrame {
        WeakFrame(Rc::downgrade(&self.0))
    }

    // ===== HIERARCHY =====

    pub fn parent(&self) -> Option<Frame> {
        self.0.borrow().parent.upgrade().map(Frame)
    }

    /// True if `self` is `other` or one of its ancestors
    fn is_ancestor_of(&self, other: &Frame) -> bool {
        let mut current = Some(other.clone());
        while let Some(frame) = current {
            if frame.ptr_eq(self) {
                return true;
            }
            current = frame.parent();
        }
        false
    }

    /// Attach `child`, detaching it from its previous parent.
    ///
    /// Re-adding a current child is a no-op. Attaching a frame to itself or
    /// to one of its descendants is rejected.
    pub fn add_child(&self, child: &Frame) -> Result<()> {
        if let Some(parent) = child.parent() {
            if parent.ptr_eq(self) {
                return Ok(());
            }
        }
        if child.is_ancestor_of(self) {
            return Err(engine_invalid_params!(
                "retained3d::Frame", "Frame {} cannot become a child of its own descendant", child.id()
            ));
        }
        if let Some(parent) = child.parent() {
            parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(child));
        }
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
        Ok(())
    }

    /// Detach a direct child; the child lives on while other handles exist
    pub fn delete_child(&self, child: &Frame) -> Result<()> {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| !c.ptr_eq(child));
            before != data.children.len()
        };
        if !removed {
            return Err(Error::NotFound(format!("frame {} is not a child of frame {}", child.id(), self.id())));
        }
        child.0.borrow_mut().parent = Weak::new();
        Ok(())
    }

    pub fn children(&self) -> Vec<Frame> {
        self.0.borrow().children.clone()
    }

    // ===== CONTENT =====

    /// Attach a mesh or frame; the same visual may be attached more than once
    pub fn add_visual(&self, visual: impl Into<Visual>) {
        self.0.borrow_mut().visuals.push(visual.into());
    }

    /// Remove the first attachment of `visual`
    pub fn delete_visual(&self, visual: &Visual) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let index = data
            .visuals
            .iter()
            .position(|v| v.ptr_eq(visual))
            .ok_or_else(|| Error::NotFound(format!("visual is not attached to frame {}", data.object.id())))?;
        data.visuals.remove(index);
        Ok(())
    }

    pub fn visuals(&self) -> Vec<Visual> {
        self.0.borrow().visuals.clone()
    }

    pub fn add_light(&self, light: &Light) {
        self.0.borrow_mut().lights.push(light.clone());
    }

    pub fn delete_light(&self, light: &Light) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let index = data
            .lights
            .iter()
            .position(|l| l.ptr_eq(light))
            .ok_or_else(|| Error::NotFound(format!("light is not attached to frame {}", data.object.id())))?;
        data.lights.remove(index);
        Ok(())
    }

    pub fn lights(&self) -> Vec<Light> {
        self.0.borrow().lights.clone()
    }

    // ===== TRANSFORM =====

    /// Local-to-parent transform
    pub fn transform(&self) -> Mat4 {
        self.0.borrow().transform
    }

    pub fn add_transform(&self, combine: CombineType, matrix: Mat4) {
        let mut data = self.0.borrow_mut();
        data.transform = match combine {
            CombineType::Replace => matrix,
            CombineType::Before => data.transform * matrix,
            CombineType::After => matrix * data.transform,
        };
    }

    /// Translation of the local transform, divided by its w
    pub fn position(&self) -> Vec3 {
        let m = self.0.borrow().transform;
        let w = if m.w_axis.w != 0.0 { m.w_axis.w } else { 1.0 };
        m.w_axis.truncate() / w
    }

    /// Local-to-world transform, up to and including the root.
    ///
    /// Walking up from this frame, each ancestor's local transform is
    /// multiplied on the right of the accumulator (`world * local`), the
    /// glam form of the legacy row-major `local x acc` product.
    pub fn world_matrix(&self) -> Mat4 {
        let mut world = self.transform();
        let mut current = self.parent();
        while let Some(frame) = current {
            world = world * frame.transform();
            current = frame.parent();
        }
        world
    }

    // ===== APPEARANCE =====

    /// Background color used when this frame is the rendered root
    pub fn scene_background(&self) -> Color {
        self.0.borrow().background
    }

    pub fn set_scene_background(&self, color: Color) {
        self.0.borrow_mut().background = color;
    }

    /// Opaque background from normalized components (truncating)
    pub fn set_scene_background_rgb(&self, r: f32, g: f32, b: f32) {
        self.set_scene_background(Color::rgba((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255));
    }

    pub fn color(&self) -> Color {
        self.0.borrow().color
    }

    pub fn set_color(&self, color: Color) {
        self.0.borrow_mut().color = color;
    }

    pub fn set_color_rgb(&self, r: f32, g: f32, b: f32) {
        self.set_color(Color::rgba((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255));
    }

    pub fn texture(&self) -> Option<Texture> {
        self.0.borrow().texture.clone()
    }

    pub fn set_texture(&self, texture: Option<Texture>) {
        self.0.borrow_mut().texture = texture;
    }
}

/// Non-owning frame reference
#[derive(Clone, Default)]
pub struct WeakFrame(Weak<RefCell<FrameData>>);

impl WeakFrame {
    pub fn upgrade(&self) -> Option<Frame> {
        self.0.upgrade().map(Frame)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for Frame {
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R {
        f(&mut self.0.borrow_mut().object)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Frame")
            .field("id", &data.object.id())
            .field("children", &data.children.len())
            .field("visuals", &data.visuals.len())
            .field("lights", &data.lights.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
