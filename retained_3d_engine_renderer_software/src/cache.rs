/// Texture and mesh caches for the software backend
///
/// Entries are keyed on source object identity and remember the source
/// version they were built from. Ids come from a `SlotAllocator` so a slot
/// released by eviction is handed out again to the next upload.

use std::cell::RefCell;
use std::hash::Hash;
use std::rc::{Rc, Weak};
use rustc_hash::{FxHashMap, FxHashSet};
use retained_3d_engine::retained3d::math::Vertex;
use retained_3d_engine::retained3d::resource::Surface;
use retained_3d_engine::retained3d::utils::SlotAllocator;
use retained_3d_engine::retained3d::ObjectId;
use retained_3d_engine::engine_trace;

const SOURCE: &str = "retained3d::software::Cache";

struct CacheEntry<T> {
    version: u32,
    data: T,
}

/// Slot-recycled table of derived resources
pub struct ResourceCache<K, T> {
    slots: SlotAllocator,
    entries: Vec<Option<CacheEntry<T>>>,
    index: FxHashMap<K, u32>,
    /// Keys whose source object already carries an eviction callback
    watched: FxHashSet<K>,
    uploads: u64,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug, T> ResourceCache<K, T> {
    pub fn new() -> Self {
        Self {
            slots: SlotAllocator::new(),
            entries: Vec::new(),
            index: FxHashMap::default(),
            watched: FxHashSet::default(),
            uploads: 0,
        }
    }

    /// Id and version of the entry built for `key`
    pub fn lookup(&self, key: &K) -> Option<(u32, u32)> {
        let id = *self.index.get(key)?;
        let entry = self.entries.get(id as usize)?.as_ref()?;
        Some((id, entry.version))
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(id as usize)?.as_ref().map(|e| &e.data)
    }

    /// Store `data` for `key`, replacing a stale entry in place (same id)
    pub fn insert(&mut self, key: K, version: u32, data: T) -> u32 {
        let id = match self.index.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.slots.alloc();
                self.index.insert(key, id);
                id
            }
        };
        let slot = id as usize;
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(CacheEntry { version, data });
        self.uploads += 1;
        id
    }

    /// Drop every entry whose key matches; returns how many went
    pub fn evict(&mut self, matches: impl Fn(&K) -> bool) -> usize {
        let doomed: Vec<(K, u32)> = self
            .index
            .iter()
            .filter(|(key, _)| matches(key))
            .map(|(key, id)| (*key, *id))
            .collect();
        for (key, id) in &doomed {
            self.index.remove(key);
            if let Some(entry) = self.entries.get_mut(*id as usize) {
                *entry = None;
            }
            self.slots.free(*id);
            engine_trace!(SOURCE, "Evicted {:?} from slot {}", key, id);
        }
        doomed.len()
    }

    /// Mark `key` as watched by a destroy callback; true only the first time
    pub fn watch(&mut self, key: K) -> bool {
        self.watched.insert(key)
    }

    pub fn is_watched(&self, key: &K) -> bool {
        self.watched.contains(key)
    }

    /// Live entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of times an entry was (re)built
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl<K: Copy + Eq + Hash + std::fmt::Debug, T> Default for ResourceCache<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mesh group geometry as it was when cached
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list
    pub indices: Vec<u32>,
    pub flat: bool,
}

/// Texture pixels converted to 32-bit ARGB, keyed on texture id
pub type TextureCache = ResourceCache<ObjectId, Surface>;

/// Mesh geometry keyed on (mesh id, group index)
pub type MeshCache = ResourceCache<(ObjectId, usize), CachedMesh>;

/// Destroy callback body: evict everything `matches` selects from a cache
/// that may already be gone
pub fn evict_on_destroy<K, T>(cache: &Weak<RefCell<ResourceCache<K, T>>>, matches: impl Fn(&K) -> bool)
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    let Some(cache) = cache.upgrade() else {
        return;
    };
    // Objects are only dropped by the host, never while a renderer call holds the cache
    if let Ok(mut cache) = cache.try_borrow_mut() {
        cache.evict(&matches);
        cache.watched.retain(|key| !matches(key));
    };
}

/// Shared ownership so destroy callbacks can reach the cache
pub fn shared<K, T>() -> Rc<RefCell<ResourceCache<K, T>>>
where
    K: Copy + Eq + Hash + std::fmt::Debug,
{
    Rc::new(RefCell::new(ResourceCache::new()))
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
