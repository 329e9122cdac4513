//! Slotcache - A bounded in-memory LRU cache
//!
//! Provides least-recently-used eviction, optional per-entry byte-size
//! accounting, and optional TTL expiration behind a purely in-process call
//! surface. Entries live in flat, handle-indexed slot storage with an
//! explicit free stack, so the memory footprint tracks the working set
//! instead of the operation count, and all recency reordering is O(1).
//!
//! Time is read from an injectable [`Clock`], never a hard-coded global;
//! staleness is evaluated lazily at access time, with [`LruCache::purge_stale`]
//! as the explicit sweep. There are no background tasks and no internal
//! locking — embedders serialize access themselves.

pub mod cache;
pub mod clock;
pub mod error;
pub mod options;

pub use cache::{CacheStats, LruCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CacheError, Result};
pub use options::{CacheOptions, DisposeReason, GetOptions, SetOptions};
