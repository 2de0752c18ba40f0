//! External classifier integration tests against a mock endpoint.

use crate::fixtures::*;
use crate::helpers::*;
use service_router::{ClassifierKind, Router, RouterError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn external_router(server: &MockServer, kind: ClassifierKind) -> Router {
    let mut config = keyword_config();
    config.classifier = kind;
    config.external.api_key = "test-key".to_string();
    config.external.endpoint = format!("{}/v1/chat/completions", server.uri());
    config.external.backoff_ms = 1;
    init_tracing();
    Router::from_config(config).expect("failed to wire router")
}

/// The external classifier sends the documented wire shape and parses the
/// decision out of the completion.
#[tokio::test]
async fn test_external_decision() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "messages": [{"role": "system"}, {"role": "user"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"service": "auth-service", "confidence": 0.93, "explanation": "login intent"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let router = external_router(&server, ClassifierKind::External);
    let result = router.route_async("log me in please").await.unwrap();

    assert_eq!(result.service(), "auth-service");
    assert!((result.confidence() - 0.93).abs() < 1e-9);
}

/// Prose-wrapped JSON still parses via brace extraction.
#[tokio::test]
async fn test_external_tolerates_wrapped_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Here you go:\n{\"service\": \"bi-service\", \"confidence\": 0.81, \"explanation\": \"analytics\"}\nDone.",
        )))
        .mount(&server)
        .await;

    let router = external_router(&server, ClassifierKind::External);
    let result = router.route_async("quarterly numbers").await.unwrap();
    assert_eq!(result.service(), "bi-service");
}

/// Transient server errors are retried until the endpoint recovers.
#[tokio::test]
async fn test_external_retries_transient_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"service": "user-service", "confidence": 0.7, "explanation": "profile"}"#,
        )))
        .mount(&server)
        .await;

    let router = external_router(&server, ClassifierKind::External);
    let result = router.route_async("open my profile").await.unwrap();
    assert_eq!(result.service(), "user-service");
}

/// Exhausted retries surface an `LlmProvider` error to the caller.
#[tokio::test]
async fn test_external_exhaustion_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // initial attempt + 2 retries
        .mount(&server)
        .await;

    let router = external_router(&server, ClassifierKind::External);
    let err = router.route_async("anything at all").await.unwrap_err();
    assert!(matches!(err, RouterError::LlmProvider { .. }));
}

/// In hybrid mode a failing external classifier falls back to keywords.
#[tokio::test]
async fn test_hybrid_falls_back_to_builtin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let router = external_router(&server, ClassifierKind::Hybrid);
    let result = router.route_async("login with my token").await.unwrap();
    assert_eq!(result.service(), "auth-service");
}

/// Graph requests never consult the external classifier.
#[tokio::test]
async fn test_graph_requests_skip_external() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = graph_config();
    config.classifier = ClassifierKind::External;
    config.external.api_key = "test-key".to_string();
    config.external.endpoint = format!("{}/v1/chat/completions", server.uri());
    let router = Router::from_config(config).expect("failed to wire router");

    let result = router.route_async("TARGET:billing-service").await.unwrap();
    assert_eq!(result.service(), "billing-service");
}

/// Missing API key is a startup configuration error.
#[test]
fn test_external_without_key_rejected() {
    let mut config = keyword_config();
    config.classifier = ClassifierKind::External;
    assert!(matches!(
        Router::from_config(config),
        Err(RouterError::Configuration { .. })
    ));
}
