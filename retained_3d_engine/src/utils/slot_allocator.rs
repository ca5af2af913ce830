/// Recycling allocator for renderer cache ids.
///
/// Ids are dense `u32` indices into a backend's cache table. A freed id is
/// handed out again by the next `alloc()`, so tables stay compact while
/// textures and meshes come and go. `u32::MAX` is never produced: backends
/// use it as their "no resource" sentinel.
///
/// # Example
///
/// ```ignore
/// let mut ids = SlotAllocator::new();
/// let a = ids.alloc();   // 0
/// let b = ids.alloc();   // 1
/// ids.free(a);           // true
/// let c = ids.alloc();   // 0 (recycled)
/// ```
pub struct SlotAllocator {
    free_list: Vec<u32>,
    live: Vec<bool>,
    len: u32,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            live: Vec::new(),
            len: 0,
        }
    }

    /// Allocate an id, reusing the most recently freed one first
    pub fn alloc(&mut self) -> u32 {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None => {
                self.live.push(false);
                (self.live.len() - 1) as u32
            }
        };
        self.live[id as usize] = true;
        self.len += 1;
        id
    }

    /// Release an id. Returns false (and changes nothing) if it is not live.
    pub fn free(&mut self, id: u32) -> bool {
        match self.live.get_mut(id as usize) {
            Some(live) if *live => {
                *live = false;
                self.len -= 1;
                self.free_list.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn is_live(&self, id: u32) -> bool {
        self.live.get(id as usize).copied().unwrap_or(false)
    }

    /// Highest id ever allocated + 1: the table size backing all ids
    pub fn high_water_mark(&self) -> u32 {
        self.live.len() as u32
    }

    /// Number of live ids
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
