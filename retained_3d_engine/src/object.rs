/// Common object state shared by every scene object
///
/// Frames, meshes, lights, textures and materials are reference-counted
/// handles. Each carries an `ObjectBase` with a process-unique id, an
/// optional name, an opaque application value and a list of destroy
/// callbacks. The callbacks fire synchronously when the last handle is
/// dropped, before the object's payload is freed; renderer backends use
/// them to evict cache entries.

use std::sync::atomic::{AtomicU64, Ordering};
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};

/// Process-unique object identifier (never reused)
pub type ObjectId = u64;

/// Callback invoked with the id of the object being destroyed
pub type DestroyCallback = Box<dyn FnOnce(ObjectId)>;

new_key_type! {
    /// Handle returned by `add_destroy_callback()`
    pub struct DestroyCallbackKey;
}

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

pub struct ObjectBase {
    id: ObjectId,
    name: Option<String>,
    app_data: u64,
    destroy_callbacks: SlotMap<DestroyCallbackKey, DestroyCallback>,
}

impl ObjectBase {
    pub fn new() -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: None,
            app_data: 0,
            destroy_callbacks: SlotMap::with_key(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_owned);
    }

    pub fn app_data(&self) -> u64 {
        self.app_data
    }

    pub fn set_app_data(&mut self, data: u64) {
        self.app_data = data;
    }

    pub fn add_destroy_callback(&mut self, callback: DestroyCallback) -> DestroyCallbackKey {
        self.destroy_callbacks.insert(callback)
    }

    pub fn delete_destroy_callback(&mut self, key: DestroyCallbackKey) -> Result<()> {
        self.destroy_callbacks
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("destroy callback on object {}", self.id)))
    }

    pub fn destroy_callback_count(&self) -> usize {
        self.destroy_callbacks.len()
    }
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        let id = self.id;
        for (_, callback) in self.destroy_callbacks.drain() {
            callback(id);
        }
    }
}

/// Object API shared by all handle types.
///
/// Implementors only provide `with_object()`; everything else is derived.
pub trait Object {
    /// Run `f` with mutable access to the object base
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R;

    fn id(&self) -> ObjectId {
        self.with_object(|o| o.id())
    }

    fn name(&self) -> Option<String> {
        self.with_object(|o| o.name().map(str::to_owned))
    }

    fn set_name(&self, name: Option<&str>) {
        self.with_object(|o| o.set_name(name))
    }

    fn app_data(&self) -> u64 {
        self.with_object(|o| o.app_data())
    }

    fn set_app_data(&self, data: u64) {
        self.with_object(|o| o.set_app_data(data))
    }

    /// Register a callback fired when the last handle to this object drops
    fn add_destroy_callback<F: FnOnce(ObjectId) + 'static>(&self, callback: F) -> DestroyCallbackKey {
        self.with_object(|o| o.add_destroy_callback(Box::new(callback)))
    }

    fn delete_destroy_callback(&self, key: DestroyCallbackKey) -> Result<()> {
        self.with_object(|o| o.delete_destroy_callback(key))
    }

    fn destroy_callback_count(&self) -> usize {
        self.with_object(|o| o.destroy_callback_count())
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
