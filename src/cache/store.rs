//! Cache Store Module
//!
//! Main cache engine combining the key map, slot arena, and recency index
//! into get/set/peek/delete/purge/iterate with LRU eviction, size-bounded
//! budgets, and lazy TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::cache::recency::{RecencyList, NIL};
use crate::cache::slots::SlotArena;
use crate::cache::stats::CacheStats;
use crate::cache::DEFAULT_ENTRY_SIZE;
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};
use crate::options::{CacheOptions, DisposeFn, DisposeReason, GetOptions, SetOptions, SizeCalculation};

// == Lru Cache ==
/// Bounded in-memory key/value cache with LRU eviction, optional per-entry
/// size accounting, and optional TTL expiration.
///
/// Single-threaded and synchronous: every operation completes before it
/// returns, staleness is evaluated lazily at access time, and there is no
/// background expiry. Wrap the cache in a lock to share it across threads.
///
/// # Example
/// ```
/// use slotcache::{CacheOptions, LruCache};
///
/// let mut cache = LruCache::new(CacheOptions::new().max(2)).unwrap();
/// cache.set("a", 1).unwrap();
/// cache.set("b", 2).unwrap();
/// cache.set("c", 3).unwrap(); // evicts "a"
///
/// assert_eq!(cache.get(&"a"), None);
/// assert_eq!(cache.get(&"c"), Some(&3));
/// ```
pub struct LruCache<K, V> {
    /// Key to live handle
    map: HashMap<K, usize>,
    /// Entry field storage and free stack
    slots: SlotArena<K, V>,
    /// Usage ordering over live handles
    recency: RecencyList,
    /// Lifetime activity counters
    stats: CacheStats,
    /// Maximum live entries
    max: Option<usize>,
    /// Maximum total size of live entries
    max_size: Option<u64>,
    /// Running sum of live entry sizes
    total_size: u64,
    /// Default TTL in milliseconds; 0 disables expiration
    ttl: u64,
    allow_stale: bool,
    update_age_on_get: bool,
    size_calculation: Option<SizeCalculation<K, V>>,
    dispose: Option<DisposeFn<K, V>>,
    clock: Box<dyn Clock>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a cache from validated options.
    ///
    /// Fails immediately when no budget is configured or a budget is zero;
    /// a rejected configuration is never retried.
    pub fn new(options: CacheOptions<K, V>) -> Result<Self> {
        options.validate()?;
        let CacheOptions {
            max,
            max_size,
            ttl,
            allow_stale,
            update_age_on_get,
            size_calculation,
            dispose,
            clock,
        } = options;

        Ok(Self {
            map: HashMap::new(),
            slots: SlotArena::new(),
            recency: RecencyList::new(),
            stats: CacheStats::new(),
            max,
            max_size,
            total_size: 0,
            ttl,
            allow_stale,
            update_age_on_get,
            size_calculation,
            dispose,
            clock: clock.unwrap_or_else(|| Box::new(SystemClock)),
        })
    }

    // == Set ==
    /// Stores a key-value pair, making it the most recently used entry.
    ///
    /// An existing key is overwritten in place: its handle is reused, its
    /// age restarts, and the replaced value is dropped without a disposal
    /// callback. After the write, least-recently-used entries are evicted
    /// (disposal reason [`DisposeReason::Evicted`]) until both budgets hold.
    ///
    /// Fails without touching the cache when the entry's size exceeds
    /// `max_size` on its own, or when no size can be determined while a
    /// byte budget is configured.
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.set_with(key, value, SetOptions::default())
    }

    /// [`set`](Self::set) with a per-entry TTL override and/or an explicit
    /// pre-computed size.
    pub fn set_with(&mut self, key: K, value: V, opts: SetOptions) -> Result<()> {
        let size = self.resolve_size(&value, &key, opts.size)?;
        if let Some(max_size) = self.max_size {
            // Eviction could never make room for this entry
            if size > max_size {
                return Err(CacheError::OversizedEntry { size, max_size });
            }
        }

        let now = self.clock.now_millis();
        let ttl = opts.ttl.unwrap_or(self.ttl);

        match self.map.get(&key) {
            Some(&handle) => {
                if let Some((_replaced, old_size)) = self.slots.replace(handle, value, size, now, ttl) {
                    self.total_size = self.total_size - old_size + size;
                }
                self.recency.promote(handle);
            }
            None => {
                let handle = self.slots.allocate(key.clone(), value, size, now, ttl);
                self.recency.ensure_slot(handle);
                self.recency.link_at_head(handle);
                self.map.insert(key, handle);
                self.total_size += size;
            }
        }

        // Evict from the tail until both budgets hold
        while self.over_budget() {
            let Some(tail) = self.recency.evict_tail() else {
                break;
            };
            trace!(handle = tail, "evicting least recently used entry");
            self.stats.record_eviction();
            self.drop_handle(tail, DisposeReason::Evicted);
        }

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key, promoting it to most recently used.
    ///
    /// A stale entry is treated as a miss unless stale reads are allowed:
    /// it is released on the spot and the disposal callback fires with
    /// reason [`DisposeReason::Expired`]. An allowed stale read returns the
    /// value without promotion or age reset.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.get_with(key, GetOptions::default())
    }

    /// [`get`](Self::get) with per-call `allow_stale` /
    /// `update_age_on_get` overrides.
    pub fn get_with(&mut self, key: &K, opts: GetOptions) -> Option<&V> {
        let handle = match self.map.get(key) {
            Some(&handle) => handle,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        let now = self.clock.now_millis();
        if self.slots.is_stale(handle, now) {
            if opts.allow_stale.unwrap_or(self.allow_stale) {
                self.stats.record_hit();
                return self.slots.value(handle);
            }
            trace!(handle, "entry expired on access");
            self.stats.record_miss();
            self.stats.record_expiration();
            self.recency.unlink(handle);
            self.drop_handle(handle, DisposeReason::Expired);
            return None;
        }

        self.recency.promote(handle);
        if opts.update_age_on_get.unwrap_or(self.update_age_on_get) {
            self.slots.touch(handle, now);
        }
        self.stats.record_hit();
        self.slots.value(handle)
    }

    // == Peek ==
    /// Looks up a value without mutating anything: no promotion, no age
    /// reset, no removal of a stale entry, no counters. Staleness still
    /// hides the entry unless the cache allows stale reads.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &handle = self.map.get(key)?;
        if !self.allow_stale && self.slots.is_stale(handle, self.clock.now_millis()) {
            return None;
        }
        self.slots.value(handle)
    }

    // == Contains ==
    /// True when the key maps to a fresh entry (or any entry, when stale
    /// reads are allowed). Never promotes.
    pub fn contains_key(&self, key: &K) -> bool {
        self.peek(key).is_some()
    }

    // == Delete ==
    /// Removes an entry, firing the disposal callback with reason
    /// [`DisposeReason::Deleted`]. Returns `false` (a no-op) when the key
    /// is absent.
    pub fn delete(&mut self, key: &K) -> bool {
        let Some(&handle) = self.map.get(key) else {
            return false;
        };
        self.recency.unlink(handle);
        self.drop_handle(handle, DisposeReason::Deleted);
        true
    }

    // == Purge Stale ==
    /// Releases every currently stale entry (disposal reason
    /// [`DisposeReason::Expired`]), regardless of recency.
    ///
    /// Survivors keep their relative order. Calling this twice with no
    /// intervening mutation changes nothing the second time. Returns the
    /// number of entries removed.
    pub fn purge_stale(&mut self) -> usize {
        let now = self.clock.now_millis();

        let mut stale = Vec::new();
        let mut cursor = self.recency.tail();
        while cursor != NIL {
            if self.slots.is_stale(cursor, now) {
                stale.push(cursor);
            }
            cursor = self.recency.prev_of(cursor);
        }

        for &handle in &stale {
            self.stats.record_expiration();
            self.recency.unlink(handle);
            self.drop_handle(handle, DisposeReason::Expired);
        }

        if !stale.is_empty() {
            debug!(purged = stale.len(), "purged stale entries");
        }
        stale.len()
    }

    // == Clear ==
    /// Removes every entry, firing the disposal callback with reason
    /// [`DisposeReason::Deleted`] for each, from least to most recent.
    pub fn clear(&mut self) {
        while let Some(tail) = self.recency.evict_tail() {
            self.drop_handle(tail, DisposeReason::Deleted);
        }
    }

    // == Iteration ==
    /// Iterates over `(key, value)` pairs from most to least recently used.
    ///
    /// Lazy and restartable; never mutates. Stale entries are skipped
    /// unless the cache allows stale reads, judged against a single clock
    /// reading taken when the iterator is created.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            cache: self,
            cursor: self.recency.head(),
            now: self.clock.now_millis(),
        }
    }

    /// Iterates from least to most recently used; otherwise identical to
    /// [`iter`](Self::iter).
    pub fn iter_oldest_first(&self) -> IterOldestFirst<'_, K, V> {
        IterOldestFirst {
            cache: self,
            cursor: self.recency.tail(),
            now: self.clock.now_millis(),
        }
    }

    // == Diagnostics ==
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no entries are live.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Running total of live entry sizes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Slots ever allocated, live or free.
    pub fn allocated_slots(&self) -> usize {
        self.slots.len()
    }

    /// Handles waiting on the free stack.
    pub fn free_slots(&self) -> usize {
        self.slots.free_len()
    }

    /// Returns a statistics snapshot with current occupancy figures.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.live_entries = self.map.len();
        stats.allocated_slots = self.slots.len();
        stats.free_slots = self.slots.free_len();
        stats.total_size = self.total_size;
        stats
    }

    // == Internal ==
    /// Size charged to an entry: explicit per-call size, else the size
    /// function, else 1 — but a byte budget with no way to size the entry
    /// is an error, as is a non-positive size.
    fn resolve_size(&self, value: &V, key: &K, explicit: Option<u64>) -> Result<u64> {
        let size = match explicit {
            Some(size) => size,
            None => match &self.size_calculation {
                Some(calc) => calc(value, key),
                None if self.max_size.is_some() => {
                    return Err(CacheError::MissingSizeCalculation)
                }
                None => DEFAULT_ENTRY_SIZE,
            },
        };
        if size == 0 {
            return Err(CacheError::InvalidEntrySize);
        }
        Ok(size)
    }

    /// True while either configured budget is exceeded.
    fn over_budget(&self) -> bool {
        self.max.is_some_and(|max| self.map.len() > max)
            || self.max_size.is_some_and(|max_size| self.total_size > max_size)
    }

    /// Releases an already-unlinked handle: map entry removed, size
    /// subtracted, slot recycled. The disposal callback runs last, once the
    /// cache's own bookkeeping is consistent; a panic inside it propagates
    /// to the caller of the mutating operation.
    fn drop_handle(&mut self, handle: usize, reason: DisposeReason) {
        if let Some((key, value, size)) = self.slots.release(handle) {
            self.map.remove(&key);
            self.total_size -= size;
            if let Some(dispose) = self.dispose.as_mut() {
                dispose(value, key, reason);
            }
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.map.len())
            .field("max", &self.max)
            .field("max_size", &self.max_size)
            .field("total_size", &self.total_size)
            .field("ttl", &self.ttl)
            .finish()
    }
}

// == Iterators ==
/// Iterator from most to least recently used.
pub struct Iter<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: usize,
    now: u64,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != NIL {
            let handle = self.cursor;
            self.cursor = self.cache.recency.next_of(handle);
            if !self.cache.allow_stale && self.cache.slots.is_stale(handle, self.now) {
                continue;
            }
            let key = self.cache.slots.key(handle)?;
            let value = self.cache.slots.value(handle)?;
            return Some((key, value));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cache.recency.len()))
    }
}

/// Iterator from least to most recently used.
pub struct IterOldestFirst<'a, K, V> {
    cache: &'a LruCache<K, V>,
    cursor: usize,
    now: u64,
}

impl<'a, K, V> Iterator for IterOldestFirst<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor != NIL {
            let handle = self.cursor;
            self.cursor = self.cache.recency.prev_of(handle);
            if !self.cache.allow_stale && self.cache.slots.is_stale(handle, self.now) {
                continue;
            }
            let key = self.cache.slots.key(handle)?;
            let value = self.cache.slots.value(handle)?;
            return Some((key, value));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cache.recency.len()))
    }
}
