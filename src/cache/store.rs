//! Cache Store Module
//!
//! Main cache engine combining HashMap lookup with an arena-backed LRU list,
//! bounded by both entry count and total bytes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, LruList, DEFAULT_MAX_BYTES, DEFAULT_MAX_ENTRIES};

// == Debug Info ==
/// One node of the recency list, as reported by [`RenderCache::debug_info`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugEntry {
    pub key: String,
    pub timestamp: u64,
    pub size: u64,
}

/// Walk of the recency list plus counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheDebugInfo {
    /// Entries from most to least recently used
    pub entries: Vec<DebugEntry>,
    pub stats: CacheStats,
    pub hit_rate: f64,
    pub max_entries: usize,
    pub max_bytes: u64,
}

// == Render Cache ==
/// LRU cache of rendering results.
///
/// Every key in `map` points at exactly one live node in `list` and every
/// live node is indexed by exactly one key. `memory_usage` always equals the
/// sum of `size` over the live entries.
#[derive(Debug)]
pub struct RenderCache {
    /// Key -> list handle
    map: HashMap<String, usize>,
    /// Recency order
    list: LruList<CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Running byte total
    memory_usage: u64,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Maximum total bytes allowed
    max_bytes: u64,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_BYTES)
    }
}

impl RenderCache {
    // == Constructor ==
    /// Creates a new RenderCache with the given entry and byte limits.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `max_bytes` - Maximum total of entry sizes in bytes
    pub fn new(max_entries: usize, max_bytes: u64) -> Self {
        Self {
            map: HashMap::new(),
            list: LruList::new(),
            stats: CacheStats::new(),
            memory_usage: 0,
            max_entries,
            max_bytes,
        }
    }

    // == Get ==
    /// Looks up an entry and marks it most recently used.
    ///
    /// Returns a copy of the entry, or None on a miss.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let Some(&idx) = self.map.get(key) else {
            self.stats.record_miss();
            return None;
        };

        self.list.move_to_front(idx);
        self.stats.record_hit();
        self.list.get(idx).cloned()
    }

    // == Set ==
    /// Stores an entry as most recently used, then evicts until both limits hold.
    ///
    /// An existing key has its entry replaced. Storing is best effort: an
    /// entry larger than `max_bytes` is inserted and immediately evicted.
    /// Returns the evicted entries, least recently used first.
    pub fn set(&mut self, key: String, entry: CacheEntry) -> Vec<CacheEntry> {
        if let Some(&idx) = self.map.get(&key) {
            if let Some(slot) = self.list.get_mut(idx) {
                self.memory_usage = self.memory_usage.saturating_sub(slot.size) + entry.size;
                *slot = entry;
            }
            self.list.move_to_front(idx);
        } else {
            self.memory_usage += entry.size;
            let idx = self.list.push_front(key.clone(), entry);
            self.map.insert(key, idx);
        }

        self.enforce_constraints()
    }

    // == Enforce Constraints ==
    /// Evicts least recently used entries until the count limit holds, then
    /// again until the byte limit holds.
    ///
    /// Stops early if the list runs dry.
    fn enforce_constraints(&mut self) -> Vec<CacheEntry> {
        let mut evicted = Vec::new();

        while self.map.len() > self.max_entries {
            match self.evict_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }

        while self.memory_usage > self.max_bytes {
            match self.evict_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }

        evicted
    }

    fn evict_lru(&mut self) -> Option<CacheEntry> {
        let idx = self.list.back()?;
        let (key, entry) = self.remove_node(idx)?;
        self.stats.record_eviction();
        debug!("Evicted cache entry {} ({} bytes)", key, entry.size);
        Some(entry)
    }

    /// Removes a node from the list and the map, releasing its bytes.
    fn remove_node(&mut self, idx: usize) -> Option<(String, CacheEntry)> {
        let (key, entry) = self.list.remove(idx)?;
        self.map.remove(&key);
        self.memory_usage = self.memory_usage.saturating_sub(entry.size);
        Some((key, entry))
    }

    // == Clear ==
    /// Drops all entries and resets counters, returning the dropped entries.
    pub fn drain(&mut self) -> Vec<CacheEntry> {
        let drained = self.list.iter().map(|(_, entry)| entry.clone()).collect();
        self.clear();
        drained
    }

    /// Drops all entries and resets counters.
    pub fn clear(&mut self) {
        self.map.clear();
        self.list.clear();
        self.stats = CacheStats::new();
        self.memory_usage = 0;
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.map.len(),
            memory_usage: self.memory_usage,
            ..self.stats.clone()
        }
    }

    // == Prune Expired ==
    /// Removes every entry whose timestamp is older than `max_age_ms`.
    ///
    /// Returns the number of entries removed. Stale entries are otherwise
    /// served until pruned or evicted.
    pub fn prune_expired(&mut self, max_age_ms: u64) -> usize {
        self.drain_expired(max_age_ms).len()
    }

    /// Like [`RenderCache::prune_expired`], but hands back the removed entries.
    pub fn drain_expired(&mut self, max_age_ms: u64) -> Vec<CacheEntry> {
        let now = current_timestamp_ms();
        let expired: Vec<usize> = self
            .map
            .values()
            .copied()
            .filter(|&idx| {
                self.list
                    .get(idx)
                    .is_some_and(|entry| entry.is_older_than(max_age_ms, now))
            })
            .collect();

        expired
            .into_iter()
            .filter_map(|idx| self.remove_node(idx))
            .map(|(_, entry)| entry)
            .collect()
    }

    // == Debug Info ==
    /// Walks the recency list from most to least recently used.
    pub fn debug_info(&self) -> CacheDebugInfo {
        let stats = self.stats();
        CacheDebugInfo {
            entries: self
                .list
                .iter()
                .map(|(key, entry)| DebugEntry {
                    key: key.to_string(),
                    timestamp: entry.timestamp,
                    size: entry.size,
                })
                .collect(),
            hit_rate: stats.hit_rate(),
            stats,
            max_entries: self.max_entries,
            max_bytes: self.max_bytes,
        }
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn memory_usage(&self) -> u64 {
        self.memory_usage
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks membership without touching recency or statistics.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}
