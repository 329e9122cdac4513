//! Slot Storage Module
//!
//! Flat, handle-indexed storage for entry fields, with a free stack that
//! recycles released handles before the arena grows. Under sustained churn
//! over a fixed key range the arena stabilizes near the working-set size
//! instead of growing with operation count.
//!
//! TTL state lives here too: each slot carries its start timestamp and
//! effective TTL, and staleness is a pure function of those fields and a
//! caller-supplied "now".

// == Slot ==
/// One entry's storage. `key`/`value` are `None` while the handle is free.
#[derive(Debug)]
struct Slot<K, V> {
    key: Option<K>,
    value: Option<V>,
    /// Size charged against the byte budget
    size: u64,
    /// Start-of-life timestamp in milliseconds
    start: u64,
    /// Effective TTL in milliseconds; 0 = never stale
    ttl: u64,
}

// == Slot Arena ==
/// Handle-indexed slot storage with a free stack.
///
/// A handle is live (fields populated, linked in the recency list) or free
/// (fields cleared, sitting on the free stack) — never both.
#[derive(Debug, Default)]
pub(crate) struct SlotArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
}

impl<K, V> SlotArena<K, V> {
    // == Constructor ==
    /// Creates an empty arena.
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    // == Allocate ==
    /// Stores a new entry and returns its handle, reusing a free slot if one
    /// is available. O(1) amortized.
    pub(crate) fn allocate(&mut self, key: K, value: V, size: u64, start: u64, ttl: u64) -> usize {
        let slot = Slot {
            key: Some(key),
            value: Some(value),
            size,
            start,
            ttl,
        };
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = slot;
                handle
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    // == Release ==
    /// Clears a live slot's fields, pushes the handle onto the free stack,
    /// and returns the owned key, value, and recorded size for disposal.
    ///
    /// Returns `None` if the handle is not live.
    pub(crate) fn release(&mut self, handle: usize) -> Option<(K, V, u64)> {
        let slot = self.slots.get_mut(handle)?;
        let key = slot.key.take()?;
        let value = slot.value.take()?;
        let size = slot.size;
        slot.size = 0;
        slot.start = 0;
        slot.ttl = 0;
        self.free.push(handle);
        Some((key, value, size))
    }

    // == Replace ==
    /// Overwrites a live slot in place for a `set` on an existing key,
    /// returning the replaced value and its recorded size.
    pub(crate) fn replace(
        &mut self,
        handle: usize,
        value: V,
        size: u64,
        start: u64,
        ttl: u64,
    ) -> Option<(V, u64)> {
        let slot = self.slots.get_mut(handle)?;
        let old_value = slot.value.replace(value)?;
        let old_size = std::mem::replace(&mut slot.size, size);
        slot.start = start;
        slot.ttl = ttl;
        Some((old_value, old_size))
    }

    // == Field Access ==
    /// Key stored at a live handle.
    pub(crate) fn key(&self, handle: usize) -> Option<&K> {
        self.slots.get(handle)?.key.as_ref()
    }

    /// Value stored at a live handle.
    pub(crate) fn value(&self, handle: usize) -> Option<&V> {
        self.slots.get(handle)?.value.as_ref()
    }

    /// Size recorded for a live handle.
    #[allow(dead_code)]
    pub(crate) fn size(&self, handle: usize) -> u64 {
        self.slots.get(handle).map_or(0, |slot| slot.size)
    }

    // == Staleness ==
    /// True when the handle's TTL is enabled and has elapsed at `now`.
    ///
    /// The boundary is strict: an entry whose TTL equals its exact age is
    /// still fresh; staleness begins one millisecond later.
    pub(crate) fn is_stale(&self, handle: usize, now: u64) -> bool {
        self.slots
            .get(handle)
            .is_some_and(|slot| slot.ttl > 0 && now.saturating_sub(slot.start) > slot.ttl)
    }

    // == Touch ==
    /// Resets a handle's start-of-life timestamp to `now`.
    pub(crate) fn touch(&mut self, handle: usize, now: u64) {
        if let Some(slot) = self.slots.get_mut(handle) {
            slot.start = now;
        }
    }

    // == Lengths ==
    /// Number of slots ever allocated, live or free.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of handles on the free stack.
    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }
}
