//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache invariants under arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::{generate_key, CacheEntry, RenderCache, RenderingOutput};

// == Strategies ==
/// Generates short cache keys so sequences revisit the same keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}".prop_map(|s| s)
}

fn size_strategy() -> impl Strategy<Value = u64> {
    0u64..400
}

fn entry(size: u64) -> CacheEntry {
    CacheEntry::new(RenderingOutput {
        file_path: "/tmp/out.svg".to_string(),
        resource_uri: "file:///tmp/out.svg".to_string(),
        content_type: "image/svg+xml".to_string(),
        file_size: size,
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, size: u64 },
    Get { key: String },
    Prune,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), size_strategy()).prop_map(|(key, size)| CacheOp::Set { key, size }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Prune),
    ]
}

fn apply(cache: &mut RenderCache, op: &CacheOp) -> Option<bool> {
    match op {
        CacheOp::Set { key, size } => {
            cache.set(key.clone(), entry(*size));
            None
        }
        CacheOp::Get { key } => Some(cache.get(key).is_some()),
        CacheOp::Prune => {
            cache.prune_expired(60_000);
            None
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Both limits hold after every operation, and the running byte total
    // always equals the sum of the stored entry sizes.
    #[test]
    fn prop_constraints_and_memory_accounting(
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
        max_entries in 1usize..8,
        max_bytes in 1u64..1000,
    ) {
        let mut cache = RenderCache::new(max_entries, max_bytes);

        for op in &ops {
            apply(&mut cache, op);

            let info = cache.debug_info();
            let total: u64 = info.entries.iter().map(|e| e.size).sum();

            prop_assert!(cache.len() <= max_entries);
            prop_assert!(cache.memory_usage() <= max_bytes);
            prop_assert_eq!(total, cache.memory_usage());
            prop_assert_eq!(info.entries.len(), cache.len());
        }
    }

    // The list and the map always index the same set of keys.
    #[test]
    fn prop_list_and_map_agree(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut cache = RenderCache::new(5, 800);

        for op in &ops {
            apply(&mut cache, op);
        }

        let keys: Vec<String> = cache.debug_info().entries.into_iter().map(|e| e.key).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(unique.len(), keys.len(), "duplicate node in recency list");
        for key in &keys {
            prop_assert!(cache.contains(key));
        }
    }

    // Hit and miss counters match the observed lookup results.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache = RenderCache::new(4, 600);
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in &ops {
            match apply(&mut cache, op) {
                Some(true) => expected_hits += 1,
                Some(false) => expected_misses += 1,
                None => {}
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.misses, expected_misses);
        prop_assert_eq!(stats.size, cache.len());
        prop_assert!(stats.hit_rate() >= 0.0 && stats.hit_rate() <= 100.0);
    }

    // With a generous byte budget, filling past capacity evicts exactly the
    // least recently used key.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set("[a-z]{3,8}", 3..10),
        touched in 0usize..100,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let mut cache = RenderCache::new(capacity, u64::MAX);

        for key in &keys {
            cache.set(key.clone(), entry(1));
        }

        // Refresh one key; the oldest remaining key becomes the victim
        let touched = touched % capacity;
        cache.get(&keys[touched]);
        let victim = if touched == 0 { &keys[1] } else { &keys[0] };

        cache.set("new-key".to_string(), entry(1));

        prop_assert_eq!(cache.len(), capacity);
        prop_assert!(!cache.contains(victim));
        prop_assert!(cache.contains(&keys[touched]));
        prop_assert!(cache.contains("new-key"));
    }

    // Equal inputs give equal keys; any differing component gives a new key.
    #[test]
    fn prop_key_generation(
        code in ".{0,200}",
        other_code in ".{0,200}",
        format in "[a-z]{1,12}",
        output in prop_oneof![Just("svg"), Just("png")],
    ) {
        prop_assert_eq!(
            generate_key(&code, &format, output),
            generate_key(&code, &format, output)
        );
        if code != other_code {
            prop_assert_ne!(
                generate_key(&code, &format, output),
                generate_key(&other_code, &format, output)
            );
        }
    }
}
