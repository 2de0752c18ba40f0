//! Path cache integration tests.

use crate::fixtures::*;
use crate::helpers::*;

/// Repeating a graph request within the TTL hits the cache: one miss,
/// then hits.
#[tokio::test]
async fn test_repeat_request_hits_cache() {
    let router = router(graph_config());

    let first = router.route_async("TARGET:billing-service").await.unwrap();
    let second = router.route_async("TARGET:billing-service").await.unwrap();

    assert_eq!(first.service(), second.service());
    assert_eq!(first.decision().explanation(), second.decision().explanation());

    let stats = router.cache_stats().expect("cache is enabled");
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.size, 1);
    assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
}

/// Different payloads occupy different cache slots.
#[tokio::test]
async fn test_distinct_payloads_distinct_entries() {
    let router = router(graph_config());

    router.route_async("TARGET:billing-service").await.unwrap();
    router.route_async("TARGET:user-service").await.unwrap();

    let stats = router.cache_stats().expect("cache is enabled");
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.size, 2);
}

/// Path failures are not cached; each attempt recomputes.
#[tokio::test]
async fn test_failures_not_cached() {
    let router = router(graph_config());

    assert!(router.route_async("TARGET:ghost").await.is_err());
    assert!(router.route_async("TARGET:ghost").await.is_err());

    let stats = router.cache_stats().expect("cache is enabled");
    assert_eq!(stats.size, 0);
    assert_eq!(stats.misses, 2);
}

/// With the cache disabled the router still routes and reports no stats.
#[tokio::test]
async fn test_cache_disabled() {
    let router = router(graph_config_uncached());

    let result = router.route_async("TARGET:user-service").await.unwrap();
    assert_eq!(result.service(), "user-service");
    assert!(router.cache_stats().is_none());
}

/// Classifier traffic never touches the path cache.
#[tokio::test]
async fn test_classifier_traffic_bypasses_cache() {
    let router = router(graph_config());

    router.route_async("hello world").await.unwrap();
    router.route_async("hello world").await.unwrap();

    let stats = router.cache_stats().expect("cache is enabled");
    assert_eq!(stats.hits + stats.misses, 0);
}

/// Concurrent identical requests settle on a single cached entry.
#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_requests_share_entry() {
    let router = std::sync::Arc::new(router(graph_config()));
    let mut handles = Vec::new();

    for _ in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            router.route_async("TARGET:billing-service").await.unwrap()
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.service(), "billing-service");
    }

    let stats = router.cache_stats().expect("cache is enabled");
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hits + stats.misses, 8);
}
