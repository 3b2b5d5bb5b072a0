//! Tests for the build-on-miss cache.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::domain::{Edge, NetworkId, RawNetwork, Station};
use crate::loader::{InMemoryStore, LoadError, RetryPolicy};
use crate::network::BuildError;

fn net(s: &str) -> NetworkId {
    NetworkId::parse(s).unwrap()
}

fn line(prefix: &str) -> RawNetwork {
    RawNetwork {
        name: Some(format!("{prefix} line")),
        stations: vec![
            Station::new(format!("{prefix}1"), format!("{prefix} North")),
            Station::new(format!("{prefix}2"), format!("{prefix} South")),
        ],
        edges: vec![Edge::new(format!("{prefix}1"), format!("{prefix}2"), 3.0)],
    }
}

fn store_with(ids: &[&str]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for id in ids {
        store.insert(net(id), line(id));
    }
    store
}

fn config(capacity: usize) -> CacheConfig {
    CacheConfig::new(capacity).with_retry(
        RetryPolicy::default()
            .with_timeout(Duration::from_secs(1))
            .with_backoff(Duration::from_millis(1), Duration::from_millis(2)),
    )
}

#[tokio::test]
async fn second_request_is_a_hit() {
    let store = store_with(&["a"]);
    let cache = CacheManager::new(store.clone(), config(2));

    let first = cache.get_or_load(&net("a")).await.unwrap();
    let second = cache.get_or_load(&net("a")).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.fetch_count(&net("a")), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.resident, 1);
}

#[tokio::test]
async fn loading_past_capacity_evicts_first_loaded() {
    let store = store_with(&["a", "b", "c"]);
    let cache = CacheManager::new(store, config(2));

    cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();
    cache.get_or_load(&net("c")).await.unwrap();

    assert_eq!(cache.status(&net("a")), EntryStatus::Absent);
    assert_eq!(cache.resident_ids(), vec![net("c"), net("b")]);
    assert_eq!(cache.stats().evictions, 1);
}

#[tokio::test]
async fn access_refreshes_recency() {
    let store = store_with(&["a", "b", "c"]);
    let cache = CacheManager::new(store, config(2));

    cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();
    cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("c")).await.unwrap();

    assert!(cache.contains(&net("a")));
    assert!(!cache.contains(&net("b")));
}

#[tokio::test]
async fn peek_does_not_refresh_recency() {
    let store = store_with(&["a", "b", "c"]);
    let cache = CacheManager::new(store, config(2));

    cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();
    assert!(cache.peek(&net("a")).is_some());
    cache.get_or_load(&net("c")).await.unwrap();

    assert!(!cache.contains(&net("a")));
    assert!(cache.peek(&net("a")).is_none());
}

#[tokio::test]
async fn rebuild_after_eviction_is_equivalent() {
    let store = store_with(&["a", "b"]);
    let cache = CacheManager::new(store.clone(), config(1));

    let original = cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();
    let rebuilt = cache.get_or_load(&net("a")).await.unwrap();

    assert!(!Arc::ptr_eq(&original, &rebuilt));
    assert!(original.same_contents(&rebuilt));
    assert_eq!(store.fetch_count(&net("a")), 2);
}

#[tokio::test]
async fn evicted_entry_survives_until_last_reader_drops() {
    let store = store_with(&["a", "b"]);
    let cache = CacheManager::new(store, config(1));

    let reader = cache.get_or_load(&net("a")).await.unwrap();
    let weak = Arc::downgrade(&reader);

    cache.get_or_load(&net("b")).await.unwrap();
    assert!(!cache.contains(&net("a")));

    // Evicted from the index, but the reader can still use it
    assert_eq!(reader.graph().station_count(), 2);
    assert!(weak.upgrade().is_some());

    drop(reader);
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn eviction_listener_sees_victims() {
    let store = store_with(&["a", "b", "c"]);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let cache = CacheManager::with_eviction_listener(store, config(1), move |id| {
        sink.lock().unwrap().push(id.clone());
    });

    cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();
    cache.get_or_load(&net("c")).await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![net("a"), net("b")]);
}

#[tokio::test]
async fn panicking_listener_does_not_fail_the_build() {
    let store = store_with(&["a", "b"]);
    let cache = CacheManager::with_eviction_listener(store, config(1), |_| {
        panic!("listener failure");
    });

    cache.get_or_load(&net("a")).await.unwrap();
    let entry = cache.get_or_load(&net("b")).await.unwrap();

    assert_eq!(entry.network_id(), &net("b"));
    assert_eq!(cache.status(&net("b")), EntryStatus::Resident);

    let stats = cache.stats();
    assert_eq!(stats.builds, 2);
    assert_eq!(stats.build_failures, 0);
    assert_eq!(stats.evictions, 1);

    assert!(cache.invalidate(&net("b")));
}

#[tokio::test]
async fn negative_weight_is_not_cached() {
    let store = InMemoryStore::new();
    let mut raw = line("a");
    raw.edges.push(Edge::new("a1", "a2", -1.0));
    store.insert(net("a"), raw);
    let cache = CacheManager::new(store.clone(), config(2));

    let err = cache.get_or_load(&net("a")).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::InvalidData {
            source: BuildError::NegativeWeight { .. },
            ..
        }
    ));
    assert_eq!(cache.status(&net("a")), EntryStatus::Absent);
    assert_eq!(cache.stats().resident, 0);
    assert_eq!(cache.stats().build_failures, 1);

    // The next request loads from scratch
    cache.get_or_load(&net("a")).await.unwrap_err();
    assert_eq!(store.fetch_count(&net("a")), 2);
}

#[tokio::test]
async fn failed_build_does_not_evict() {
    let store = store_with(&["a"]);
    let cache = CacheManager::new(store, config(1));

    cache.get_or_load(&net("a")).await.unwrap();
    let err = cache.get_or_load(&net("missing")).await.unwrap_err();

    assert_eq!(err, LoadError::NotFound(net("missing")));
    assert!(cache.contains(&net("a")));
    assert_eq!(cache.stats().evictions, 0);
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let store = store_with(&["a"]);
    store.fail_next(net("a"), 1);
    let cache = CacheManager::new(store.clone(), config(1));

    cache.get_or_load(&net("a")).await.unwrap();
    assert_eq!(store.fetch_count(&net("a")), 2);
}

#[tokio::test]
async fn exhausted_retries_then_recovery() {
    let store = store_with(&["a"]);
    store.fail_next(net("a"), 3);
    let cache = CacheManager::new(store.clone(), config(1));

    let err = cache.get_or_load(&net("a")).await.unwrap_err();
    assert!(matches!(err, LoadError::StoreUnavailable { attempts: 3, .. }));
    assert_eq!(cache.status(&net("a")), EntryStatus::Absent);

    assert!(cache.get_or_load(&net("a")).await.is_ok());
    assert_eq!(store.fetch_count(&net("a")), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_build() {
    let store = store_with(&["a"]).with_latency(Duration::from_millis(50));
    let cache = CacheManager::new(store.clone(), config(2));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_load(&net("a")).await })
        })
        .collect();

    let mut entries = Vec::new();
    for handle in handles {
        entries.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(store.fetch_count(&net("a")), 1);
    assert_eq!(cache.stats().builds, 1);
    assert!(entries.iter().all(|e| Arc::ptr_eq(e, &entries[0])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_failure() {
    let store = InMemoryStore::new().with_latency(Duration::from_millis(50));
    let cache = CacheManager::new(store.clone(), config(2));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_load(&net("ghost")).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(
            handle.await.unwrap().unwrap_err(),
            LoadError::NotFound(net("ghost"))
        );
    }

    assert_eq!(store.fetch_count(&net("ghost")), 1);
    assert_eq!(cache.status(&net("ghost")), EntryStatus::Absent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn different_networks_load_independently() {
    let store = store_with(&["a", "b", "c"]).with_latency(Duration::from_millis(20));
    let cache = CacheManager::new(store.clone(), config(3));

    let (na, nb, nc) = (net("a"), net("b"), net("c"));
    let (a, b, c) = tokio::join!(
        cache.get_or_load(&na),
        cache.get_or_load(&nb),
        cache.get_or_load(&nc),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(store.total_fetches(), 3);
    assert_eq!(cache.stats().resident, 3);
}

#[tokio::test(start_paused = true)]
async fn status_reports_loading_during_build() {
    let store = store_with(&["a"]).with_latency(Duration::from_millis(500));
    let cache = CacheManager::new(store, config(1));

    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.get_or_load(&net("a")).await })
    };
    tokio::task::yield_now().await;

    assert_eq!(cache.status(&net("a")), EntryStatus::Loading);

    waiter.await.unwrap().unwrap();
    assert_eq!(cache.status(&net("a")), EntryStatus::Resident);
}

#[tokio::test]
async fn build_completes_after_caller_gives_up() {
    let store = store_with(&["a"]).with_latency(Duration::from_millis(30));
    let cache = CacheManager::new(store.clone(), config(1));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(1), cache.get_or_load(&net("a"))).await;
    assert!(abandoned.is_err());

    let entry = cache.get_or_load(&net("a")).await.unwrap();
    assert_eq!(entry.network_id(), &net("a"));
    assert_eq!(store.fetch_count(&net("a")), 1);
}

#[tokio::test]
async fn invalidate_and_close_release_entries() {
    let store = store_with(&["a", "b"]);
    let cache = CacheManager::new(store.clone(), config(2));

    let held = cache.get_or_load(&net("a")).await.unwrap();
    cache.get_or_load(&net("b")).await.unwrap();

    assert!(cache.invalidate(&net("b")));
    assert!(!cache.invalidate(&net("b")));
    assert_eq!(cache.resident_ids(), vec![net("a")]);

    cache.close();
    assert_eq!(cache.stats().resident, 0);
    assert_eq!(held.network_id(), &net("a"));

    cache.get_or_load(&net("a")).await.unwrap();
    assert_eq!(store.fetch_count(&net("a")), 2);
}
