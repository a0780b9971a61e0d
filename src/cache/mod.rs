//! Cache Module
//!
//! Provides an in-memory LRU cache of rendering results bounded by entry
//! count and total artifact bytes.

mod entry;
mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{create_cache_entry, current_timestamp_ms, CacheEntry, RenderingOutput};
pub use key::{generate_key, KEY_LENGTH};
pub use lru::LruList;
pub use stats::CacheStats;
pub use store::{CacheDebugInfo, DebugEntry, RenderCache};

// == Public Constants ==
/// Default maximum number of cached renders
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default maximum total bytes referenced by the cache
pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024; // 50 MiB

/// Default age after which `prune_expired` drops an entry
pub const DEFAULT_MAX_AGE_MS: u64 = 60 * 60 * 1000; // 1 hour
