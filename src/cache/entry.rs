//! Cache Entry Module
//!
//! Defines rendered-artifact metadata and the cache entry wrapping it.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// == Rendering Output ==
/// Location and metadata of a rendered artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderingOutput {
    /// Absolute path the artifact was written to
    pub file_path: String,
    /// `file://` URI for the artifact
    pub resource_uri: String,
    /// `image/png` or `image/svg+xml`
    pub content_type: String,
    /// Number of bytes written
    pub file_size: u64,
}

// == Cache Entry ==
/// A cached render result plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The rendered artifact metadata
    pub data: RenderingOutput,
    /// Insertion timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Bytes charged against the cache memory budget
    pub size: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    ///
    /// The entry is charged the artifact's byte length.
    pub fn new(data: RenderingOutput) -> Self {
        Self::with_timestamp(data, current_timestamp_ms())
    }

    /// Creates an entry with an explicit insertion timestamp.
    pub fn with_timestamp(data: RenderingOutput, timestamp: u64) -> Self {
        let size = data.file_size;
        Self {
            data,
            timestamp,
            size,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was created.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.timestamp)
    }

    /// Whether the entry is strictly older than `max_age_ms` at time `now`.
    pub fn is_older_than(&self, max_age_ms: u64, now: u64) -> bool {
        self.timestamp < now.saturating_sub(max_age_ms)
    }
}

/// Wraps a freshly rendered output into a cache entry.
pub fn create_cache_entry(output: RenderingOutput) -> CacheEntry {
    CacheEntry::new(output)
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn output(size: u64) -> RenderingOutput {
        RenderingOutput {
            file_path: "/tmp/diagram.svg".to_string(),
            resource_uri: "file:///tmp/diagram.svg".to_string(),
            content_type: "image/svg+xml".to_string(),
            file_size: size,
        }
    }

    #[test]
    fn test_create_cache_entry_uses_file_size() {
        let before = current_timestamp_ms();
        let entry = create_cache_entry(output(2048));

        assert_eq!(entry.size, 2048);
        assert_eq!(entry.data.file_path, "/tmp/diagram.svg");
        assert!(entry.timestamp >= before);
        assert!(entry.timestamp <= current_timestamp_ms());
    }

    #[test]
    fn test_age_of_backdated_entry() {
        let entry = CacheEntry::with_timestamp(output(1), current_timestamp_ms() - 5_000);
        assert!(entry.age_ms() >= 5_000);
    }

    #[test]
    fn test_is_older_than_boundary() {
        let now = 10_000;
        let entry = CacheEntry::with_timestamp(output(1), 4_000);

        // Exactly at the cutoff is not older
        assert!(!entry.is_older_than(6_000, now));
        assert!(entry.is_older_than(5_999, now));
    }

    #[test]
    fn test_is_older_than_saturates() {
        let entry = CacheEntry::with_timestamp(output(1), 0);
        assert!(!entry.is_older_than(u64::MAX, 1_000));
    }
}
