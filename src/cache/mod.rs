//! Cache Module
//!
//! Provides the bounded in-memory cache engine: slot storage with handle
//! recycling, LRU recency tracking, size accounting, and TTL staleness.

mod recency;
mod slots;
mod stats;
mod store;


// Re-export public types
pub use stats::CacheStats;
pub use store::{Iter, IterOldestFirst, LruCache};

// == Public Constants ==
/// Size charged to an entry when no size function or explicit size is given
pub const DEFAULT_ENTRY_SIZE: u64 = 1;
