//! Options Module
//!
//! Cache construction options plus per-call overrides for `set` and `get`.
//!
//! Options are supplied in process by the embedder; the cache validates them
//! once at construction and rejects configurations it could never honor.

use std::fmt;

use crate::clock::Clock;
use crate::error::{CacheError, Result};

// == Dispose Reason ==
/// Why an entry left the cache, passed to the disposal callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisposeReason {
    /// Removed by the eviction loop to satisfy a capacity or size budget
    Evicted,
    /// Removed by an explicit `delete` or `clear`
    Deleted,
    /// Removed because its TTL elapsed
    Expired,
}

// == Callback Aliases ==
/// Computes the size charged to an entry, from its value and key.
pub type SizeCalculation<K, V> = Box<dyn Fn(&V, &K) -> u64>;

/// Invoked with the owned value, key, and removal reason when an entry
/// leaves the cache.
pub type DisposeFn<K, V> = Box<dyn FnMut(V, K, DisposeReason)>;

// == Cache Options ==
/// Construction options for [`LruCache`](crate::LruCache).
///
/// At least one of [`max`](Self::max) and [`max_size`](Self::max_size) must
/// be set; everything else is optional.
///
/// # Example
/// ```
/// use slotcache::{CacheOptions, LruCache};
///
/// let cache: LruCache<String, String> =
///     LruCache::new(CacheOptions::new().max(100).ttl(5_000)).unwrap();
/// # let _ = cache;
/// ```
pub struct CacheOptions<K, V> {
    /// Maximum number of live entries
    pub(crate) max: Option<usize>,
    /// Maximum total size of live entries, in bytes
    pub(crate) max_size: Option<u64>,
    /// Default TTL in milliseconds; 0 disables expiration
    pub(crate) ttl: u64,
    /// Serve stale entries from `get`/`peek`/iteration instead of hiding them
    pub(crate) allow_stale: bool,
    /// Reset an entry's age on every fresh `get` hit
    pub(crate) update_age_on_get: bool,
    /// Size function applied to each inserted value
    pub(crate) size_calculation: Option<SizeCalculation<K, V>>,
    /// Callback fired when an entry leaves the cache
    pub(crate) dispose: Option<DisposeFn<K, V>>,
    /// Time source; defaults to the system wall clock
    pub(crate) clock: Option<Box<dyn Clock>>,
}

impl<K, V> CacheOptions<K, V> {
    // == Constructor ==
    /// Creates an empty options set. Unusable as-is: a budget must be added
    /// before [`LruCache::new`](crate::LruCache::new) will accept it.
    pub fn new() -> Self {
        Self {
            max: None,
            max_size: None,
            ttl: 0,
            allow_stale: false,
            update_age_on_get: false,
            size_calculation: None,
            dispose: None,
            clock: None,
        }
    }

    /// Caps the number of live entries.
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Caps the total size of live entries, in bytes.
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Sets the default TTL in milliseconds. 0 (the default) disables
    /// expiration for entries without a per-call override.
    pub fn ttl(mut self, ttl_millis: u64) -> Self {
        self.ttl = ttl_millis;
        self
    }

    /// Serves stale entries instead of treating them as misses. A stale read
    /// never promotes the entry or resets its age.
    pub fn allow_stale(mut self, allow_stale: bool) -> Self {
        self.allow_stale = allow_stale;
        self
    }

    /// Resets an entry's age on every fresh `get` hit, extending its life.
    pub fn update_age_on_get(mut self, update_age_on_get: bool) -> Self {
        self.update_age_on_get = update_age_on_get;
        self
    }

    /// Sets the size function applied to inserted values. Required when
    /// [`max_size`](Self::max_size) is set and callers do not pass explicit
    /// sizes on `set`.
    pub fn size_calculation(mut self, calc: impl Fn(&V, &K) -> u64 + 'static) -> Self {
        self.size_calculation = Some(Box::new(calc));
        self
    }

    /// Sets the disposal callback. It runs synchronously inside the mutating
    /// call that removes the entry, after the cache's own bookkeeping is
    /// already consistent; a panic in the callback propagates to the caller.
    pub fn dispose(mut self, dispose: impl FnMut(V, K, DisposeReason) + 'static) -> Self {
        self.dispose = Some(Box::new(dispose));
        self
    }

    /// Replaces the system clock with an injected time source.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    // == Validation ==
    /// Rejects configurations the cache could never honor.
    pub(crate) fn validate(&self) -> Result<()> {
        match (self.max, self.max_size) {
            (None, None) => Err(CacheError::MissingBudget),
            (Some(0), _) => Err(CacheError::InvalidMax),
            (_, Some(0)) => Err(CacheError::InvalidMaxSize),
            _ => Ok(()),
        }
    }
}

impl<K, V> Default for CacheOptions<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for CacheOptions<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheOptions")
            .field("max", &self.max)
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .field("allow_stale", &self.allow_stale)
            .field("update_age_on_get", &self.update_age_on_get)
            .field("size_calculation", &self.size_calculation.is_some())
            .field("dispose", &self.dispose.is_some())
            .finish()
    }
}

// == Set Options ==
/// Per-call overrides for `set`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetOptions {
    /// TTL override in milliseconds for this entry; falls back to the
    /// cache default when `None`
    pub ttl: Option<u64>,
    /// Explicit pre-computed size for this entry; takes precedence over
    /// the configured size function
    pub size: Option<u64>,
}

// == Get Options ==
/// Per-call overrides for `get`; each field falls back to the cache
/// configuration when `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Serve a stale entry instead of expiring it
    pub allow_stale: Option<bool>,
    /// Reset the entry's age on a fresh hit
    pub update_age_on_get: Option<bool>,
}
