//! Integration Tests for the Cache Engine
//!
//! Exercises the public surface end to end: recency scenarios, budgets,
//! TTL expiration against an injected clock, disposal callbacks, and the
//! diagnostics snapshot.

use std::cell::RefCell;
use std::rc::Rc;

use slotcache::{
    CacheOptions, DisposeReason, GetOptions, LruCache, ManualClock, SetOptions,
};

// == Helper Functions ==

fn string_cache(options: CacheOptions<String, String>) -> LruCache<String, String> {
    LruCache::new(options).unwrap()
}

fn set(cache: &mut LruCache<String, String>, key: &str, value: &str) {
    cache.set(key.to_string(), value.to_string()).unwrap();
}

fn keys_newest_first(cache: &LruCache<String, String>) -> Vec<String> {
    cache.iter().map(|(key, _)| key.clone()).collect()
}

// == Recency Scenarios ==

#[test]
fn test_promotion_changes_the_eviction_victim() {
    // max=3; a, b, c; touching a sacrifices b when d arrives
    let mut cache = string_cache(CacheOptions::new().max(3));
    set(&mut cache, "a", "1");
    set(&mut cache, "b", "2");
    set(&mut cache, "c", "3");

    assert!(cache.get(&"a".to_string()).is_some());
    set(&mut cache, "d", "4");

    assert_eq!(cache.get(&"b".to_string()), None);
    assert_eq!(keys_newest_first(&cache), vec!["d", "a", "c"]);
}

#[test]
fn test_capacity_boundary_holds_exactly() {
    let max = 10;
    let mut cache = string_cache(CacheOptions::new().max(max));

    for i in 0..=max {
        set(&mut cache, &format!("key{i}"), "value");
    }

    assert_eq!(cache.len(), max);
    // the very first insert was the least recently used at eviction time
    assert_eq!(cache.get(&"key0".to_string()), None);
    for i in 1..=max {
        assert!(cache.contains_key(&format!("key{i}")));
    }
}

#[test]
fn test_get_sequence_is_mirrored_by_iteration() {
    let mut cache = string_cache(CacheOptions::new().max(5));
    for key in ["a", "b", "c", "d", "e"] {
        set(&mut cache, key, "value");
    }

    for key in ["c", "a", "e", "b", "d"] {
        cache.get(&key.to_string()).unwrap();
    }

    assert_eq!(keys_newest_first(&cache), vec!["d", "b", "e", "a", "c"]);
    let oldest_first: Vec<String> = cache
        .iter_oldest_first()
        .map(|(key, _)| key.clone())
        .collect();
    assert_eq!(oldest_first, vec!["c", "a", "e", "b", "d"]);
}

// == TTL Scenarios ==

#[test]
fn test_purged_entry_is_gone_even_with_stale_reads() {
    // default ttl 100; entry overridden to ttl 1; purge at t=10 removes it
    let clock = ManualClock::new(0);
    let mut cache: LruCache<String, u32> = LruCache::new(
        CacheOptions::new().max(10).ttl(100).clock(clock.clone()),
    )
    .unwrap();

    cache
        .set_with(
            "k".to_string(),
            1,
            SetOptions {
                ttl: Some(1),
                ..Default::default()
            },
        )
        .unwrap();

    clock.advance(10);
    assert_eq!(cache.purge_stale(), 1);

    let gone = cache.get_with(
        &"k".to_string(),
        GetOptions {
            allow_stale: Some(true),
            ..Default::default()
        },
    );
    assert_eq!(gone, None);
}

#[test]
fn test_expiry_is_lazy_until_accessed_or_purged() {
    let clock = ManualClock::new(0);
    let mut cache = string_cache(
        CacheOptions::new().max(10).ttl(50).clock(clock.clone()),
    );

    set(&mut cache, "a", "1");
    set(&mut cache, "b", "2");
    clock.advance(100);

    // nothing has been removed yet; staleness is only evaluated on access
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get(&"a".to_string()), None);
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.purge_stale(), 1);
    assert!(cache.is_empty());
    assert_eq!(cache.purge_stale(), 0);
}

#[test]
fn test_stale_reads_serve_without_extending_life() {
    let clock = ManualClock::new(0);
    let mut cache = string_cache(
        CacheOptions::new()
            .max(10)
            .ttl(50)
            .allow_stale(true)
            .clock(clock.clone()),
    );

    set(&mut cache, "a", "1");
    clock.advance(200);

    assert_eq!(cache.get(&"a".to_string()), Some(&"1".to_string()));
    assert_eq!(cache.peek(&"a".to_string()), Some(&"1".to_string()));
    // still stale afterwards: the read did not reset its age
    clock.advance(1);
    assert_eq!(cache.get(&"a".to_string()), Some(&"1".to_string()));
    assert_eq!(cache.len(), 1);
}

// == Budget Scenarios ==

#[test]
fn test_size_budget_drives_eviction() {
    let evicted: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&evicted);

    let mut cache: LruCache<String, Vec<u8>> = LruCache::new(
        CacheOptions::new()
            .max_size(100)
            .size_calculation(|value: &Vec<u8>, _key| value.len() as u64)
            .dispose(move |_value, key, reason| {
                assert_eq!(reason, DisposeReason::Evicted);
                sink.borrow_mut().push(key);
            }),
    )
    .unwrap();

    cache.set("a".to_string(), vec![0u8; 40]).unwrap();
    cache.set("b".to_string(), vec![0u8; 40]).unwrap();
    cache.set("c".to_string(), vec![0u8; 40]).unwrap();

    assert_eq!(cache.total_size(), 80);
    assert_eq!(evicted.borrow().as_slice(), &["a".to_string()]);
}

#[test]
fn test_both_budgets_hold_simultaneously() {
    let mut cache: LruCache<String, String> = LruCache::new(
        CacheOptions::new()
            .max(3)
            .max_size(10)
            .size_calculation(|value: &String, _key| value.len() as u64),
    )
    .unwrap();

    set(&mut cache, "a", "xxxx"); // 4
    set(&mut cache, "b", "xxxx"); // 4
    set(&mut cache, "c", "xxxx"); // 4 -> over size budget, evict a
    set(&mut cache, "d", "x"); // 1 -> count fine, size 9

    assert!(cache.len() <= 3);
    assert!(cache.total_size() <= 10);
    assert_eq!(keys_newest_first(&cache), vec!["d", "c", "b"]);
}

#[test]
fn test_oversized_set_fails_and_changes_nothing() {
    let mut cache: LruCache<String, String> = LruCache::new(
        CacheOptions::new()
            .max_size(8)
            .size_calculation(|value: &String, _key| value.len() as u64),
    )
    .unwrap();

    set(&mut cache, "a", "xxxx");
    let before = keys_newest_first(&cache);

    assert!(cache
        .set("huge".to_string(), "x".repeat(64))
        .is_err());
    assert_eq!(keys_newest_first(&cache), before);
    assert_eq!(cache.total_size(), 4);
}

// == Disposal Scenarios ==

#[test]
fn test_dispose_reports_each_removal_reason() {
    let clock = ManualClock::new(0);
    let log: Rc<RefCell<Vec<(String, String, DisposeReason)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);

    let mut cache: LruCache<String, String> = LruCache::new(
        CacheOptions::new()
            .max(2)
            .ttl(100)
            .clock(clock.clone())
            .dispose(move |value, key, reason| sink.borrow_mut().push((key, value, reason))),
    )
    .unwrap();

    set(&mut cache, "a", "1");
    set(&mut cache, "b", "2");
    set(&mut cache, "c", "3"); // evicts a
    assert!(cache.delete(&"b".to_string()));
    clock.advance(101);
    assert_eq!(cache.purge_stale(), 1); // expires c

    let log = log.borrow();
    assert_eq!(
        log.as_slice(),
        &[
            ("a".to_string(), "1".to_string(), DisposeReason::Evicted),
            ("b".to_string(), "2".to_string(), DisposeReason::Deleted),
            ("c".to_string(), "3".to_string(), DisposeReason::Expired),
        ]
    );
}

// == Storage Reuse ==

#[test]
fn test_storage_stabilizes_under_sustained_churn() {
    let max = 16;
    let mut cache = string_cache(CacheOptions::new().max(max));

    for i in 0..10_000usize {
        set(
            &mut cache,
            &format!("key{}", i % (max * 2)),
            &format!("value{i}"),
        );
    }

    assert_eq!(cache.len(), max);
    assert!(cache.allocated_slots() <= max + 1);
    assert!(cache.free_slots() <= 1);
    assert_eq!(
        cache.len() + cache.free_slots(),
        cache.allocated_slots()
    );
}

// == Diagnostics ==

#[test]
fn test_stats_snapshot_serializes() {
    let mut cache = string_cache(CacheOptions::new().max(2));
    set(&mut cache, "a", "1");
    set(&mut cache, "b", "2");
    set(&mut cache, "c", "3"); // evicts a
    cache.get(&"b".to_string()).unwrap();
    cache.get(&"gone".to_string());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.live_entries, 2);

    let json: serde_json::Value = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["hits"], 1);
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["live_entries"], 2);
    assert_eq!(json["free_slots"], 1);
}
