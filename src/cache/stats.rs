//! Cache Statistics Module
//!
//! Diagnostic counters and occupancy figures for instrumentation. The
//! snapshot carries no functional contract; it exists so embedders can
//! export hit rates and watch slot recycling behave under churn.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache activity and occupancy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value (including allowed stale reads)
    pub hits: u64,
    /// Lookups that returned nothing (absent key or expired entry)
    pub misses: u64,
    /// Entries removed to satisfy a capacity or size budget
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Live entries at snapshot time
    pub live_entries: usize,
    /// Slots ever allocated, live or free
    pub allocated_slots: usize,
    /// Handles waiting on the free stack
    pub free_slots: usize,
    /// Sum of live entry sizes
    pub total_size: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a snapshot with all figures at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}
