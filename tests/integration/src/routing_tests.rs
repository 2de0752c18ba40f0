//! Routing integration tests
//!
//! End-to-end scenarios through the public facade: keyword hits, word
//! boundaries, Dijkstra dispatch, threshold fallback, and A/B splitting.

use crate::fixtures::*;
use crate::helpers::*;
use service_router::{Router, RouterError, ServiceDefinition};

/// A matched keyword routes to its service with raised confidence.
#[tokio::test]
async fn test_keyword_hit() {
    let router = router(keyword_config());
    let result = router
        .route_async("Please encrypt and KPI report")
        .await
        .unwrap();

    assert_eq!(result.service(), "bi-service");
    assert!(result.confidence() > 0.5);
    let explanation = result.decision().explanation().to_lowercase();
    assert!(explanation.contains("kpi") || explanation.contains("report"));
}

/// No keyword match falls back to the default service at 0.5.
#[tokio::test]
async fn test_no_match_returns_default() {
    let router = router(keyword_config());
    let result = router.route_async("hello world").await.unwrap();

    assert_eq!(result.service(), "default-service");
    assert!((result.confidence() - 0.5).abs() < f64::EPSILON);
}

/// Substring occurrences are not word-boundary matches.
#[tokio::test]
async fn test_word_boundary_rejects_substrings() {
    let router = router(keyword_config());
    let result = router.route_async("Please tokenize this").await.unwrap();
    assert_eq!(result.service(), "default-service");
}

/// Explicit target: the two-hop path outperforms the expensive direct
/// edge.
#[tokio::test]
async fn test_dijkstra_direct_target() {
    let router = router(graph_config());
    let result = router.route_async("TARGET:user-service").await.unwrap();

    assert_eq!(result.service(), "user-service");
    assert!((result.confidence() - 0.90).abs() < f64::EPSILON);
    let explanation = result.decision().explanation();
    assert!(explanation.starts_with("Optimal path: gateway \u{2192} auth-service \u{2192} user-service"));
    assert!(explanation.contains("hops: 2"));
}

/// Three hops to billing, confidence 0.85.
#[tokio::test]
async fn test_dijkstra_multi_hop() {
    let router = router(graph_config());
    let result = router.route_async("TARGET:billing-service").await.unwrap();

    assert_eq!(result.service(), "billing-service");
    assert!((result.confidence() - 0.85).abs() < f64::EPSILON);
    assert!(result
        .decision()
        .explanation()
        .contains("gateway \u{2192} auth-service \u{2192} user-service \u{2192} billing-service"));
    assert!(result.decision().explanation().contains("hops: 3"));
}

/// Cost-sensitive phrasing dispatches through the pathfinder, not the
/// classifier.
#[tokio::test]
async fn test_cost_sensitive_dispatch() {
    let router = router(graph_config());
    let result = router
        .route_async("Find cheapest way to fetch billing")
        .await
        .unwrap();

    assert!(result.decision().explanation().starts_with("Optimal path:"));
    assert_eq!(result.service(), "billing-service");
}

/// A decision below the floor is rewritten to the fallback service,
/// keeping its confidence and recording the original service.
#[tokio::test]
async fn test_threshold_fallback() {
    let mut config = keyword_config();
    config.confidence_threshold = 0.7;
    config.fallback_service = Some("review-queue".to_string());
    let router = router(config);

    // No keyword hit: default decision at 0.5, below the 0.7 floor.
    let result = router.route_async("something unmatched").await.unwrap();
    assert_eq!(result.service(), "review-queue");
    assert!((result.confidence() - 0.5).abs() < f64::EPSILON);
    assert!(result.decision().explanation().contains("default-service"));
}

/// Strict mode surfaces `LowConfidence` instead of rewriting.
#[tokio::test]
async fn test_threshold_strict_mode() {
    let mut config = keyword_config();
    config.confidence_threshold = 0.7;
    config.strict = true;
    let router = router(config);

    let err = router.route_async("something unmatched").await.unwrap_err();
    assert!(matches!(err, RouterError::LowConfidence { .. }));
}

/// A/B entries redirect the decided service with the configured
/// probability and prefix the explanation.
#[tokio::test]
async fn test_ab_split() {
    use service_router::AbTestConfig;

    let mut config = keyword_config();
    config.ab_tests.insert(
        "auth-service".to_string(),
        AbTestConfig {
            test_service: "auth-service-v2".to_string(),
            probability: 0.25,
        },
    );
    let router = Router::from_config_with_random(config, Some(Box::new(FixedRandom(0.1))))
        .expect("failed to wire router");

    let result = router.route_async("login please").await.unwrap();
    assert_eq!(result.service(), "auth-service-v2");
    assert!(result
        .decision()
        .explanation()
        .starts_with("A/B test variant (25%): "));
}

/// Unknown explicit targets and unreachable nodes are errors, not
/// fallback decisions.
#[tokio::test]
async fn test_path_failures_surface() {
    let router = router(graph_config());

    let err = router.route_async("TARGET:ghost-service").await.unwrap_err();
    assert!(matches!(err, RouterError::UnknownTarget { .. }));

    // No explicit target and no target keyword in a multi-hop request.
    let err = router
        .route_async("orchestrate the nightly batch workflow")
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::NoTarget));
}

/// Oversized and dangerous payloads are rejected before classification.
#[tokio::test]
async fn test_input_validation() {
    let router = router(keyword_config());

    let oversized = "x".repeat(10_001);
    assert!(matches!(
        router.route_async(&oversized).await.unwrap_err(),
        RouterError::InvalidInput { .. }
    ));
    assert!(router
        .route_async("<script>alert('x')</script>")
        .await
        .is_err());
    assert!(router.route_async("   ").await.is_err());
}

/// Registering and deregistering services rebuilds the keyword index.
#[tokio::test]
async fn test_dynamic_registry_updates() {
    let router = router(keyword_config());

    router.registry().register(
        ServiceDefinition::new(
            "search-service",
            "Search",
            vec!["query".to_string(), "search".to_string()],
        )
        .unwrap(),
    );
    let result = router.route_async("search the docs").await.unwrap();
    assert_eq!(result.service(), "search-service");

    router.registry().deregister("search-service");
    let result = router.route_async("search the docs").await.unwrap();
    assert_eq!(result.service(), "default-service");
}

/// The blocking facade and batch variant agree with the async path.
#[test]
fn test_blocking_and_batch() {
    let router = router(keyword_config());

    let single = router.route("login now").unwrap();
    assert_eq!(single.service(), "auth-service");

    let batch = router
        .route_batch(&["login now", "kpi dashboard", "nothing here"])
        .unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch[0].as_ref().unwrap().service(), "auth-service");
    assert_eq!(batch[1].as_ref().unwrap().service(), "bi-service");
    assert_eq!(batch[2].as_ref().unwrap().service(), "default-service");
}

/// Results carry a wall-clock timestamp and non-negative timing.
#[tokio::test]
async fn test_result_metadata() {
    let router = router(keyword_config());
    let before = chrono::Utc::now();
    let result = router.route_async("login").await.unwrap();

    assert!(result.timestamp() >= before);
    assert!(result.timestamp() <= chrono::Utc::now());
}

/// Config wiring failures surface as `Configuration` errors.
#[test]
fn test_invalid_configuration_rejected() {
    let mut config = graph_config();
    config.graph.source = String::new();
    assert!(matches!(
        Router::from_config(config),
        Err(RouterError::Configuration { .. })
    ));
}
