//! Clock Module
//!
//! Time source abstraction for TTL tracking.
//!
//! The cache never reads ambient wall-clock time directly. All timestamps
//! come from a [`Clock`] supplied at construction, so embedders can drive
//! expiration with a synthetic clock and tests stay deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Clock Trait ==
/// A source of monotonically non-decreasing millisecond timestamps.
pub trait Clock {
    /// Returns the current time in milliseconds.
    fn now_millis(&self) -> u64;
}

// == System Clock ==
/// Default clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

// == Manual Clock ==
/// A manually advanced clock.
///
/// Clones share the same underlying time, so an embedder (or a test) can
/// keep one handle, hand another to the cache, and advance time explicitly.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock starting at the given millisecond timestamp.
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_millis)),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }

    /// Sets the clock to an absolute millisecond timestamp.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_reads_time() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(a > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_starts_at_given_time() {
        let clock = ManualClock::new(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(0);
        clock.advance(100);
        assert_eq!(clock.now_millis(), 100);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 105);
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::new(1000);
        clock.set(10);
        assert_eq!(clock.now_millis(), 10);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(0);
        let other = clock.clone();
        clock.advance(250);
        assert_eq!(other.now_millis(), 250);
    }
}
