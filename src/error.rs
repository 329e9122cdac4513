//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! A lookup that finds nothing is not an error: `get`, `peek`, and `delete`
//! report misses through `Option`/`bool` return values. The variants here
//! cover configuration mistakes and entries that can never be admitted.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Neither an entry cap nor a byte budget was configured
    #[error("cache requires at least one of max or max_size")]
    MissingBudget,

    /// The entry cap must be a positive integer
    #[error("max must be a positive integer")]
    InvalidMax,

    /// The byte budget must be a positive number
    #[error("max_size must be a positive number")]
    InvalidMaxSize,

    /// A byte budget is configured but no size can be determined for an entry
    #[error("size_calculation or an explicit entry size is required when max_size is set")]
    MissingSizeCalculation,

    /// An entry size must be a positive integer
    #[error("entry size must be a positive integer")]
    InvalidEntrySize,

    /// A single entry is larger than the whole byte budget; it can never fit
    #[error("entry size {size} exceeds max_size {max_size}")]
    OversizedEntry { size: u64, max_size: u64 },
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
