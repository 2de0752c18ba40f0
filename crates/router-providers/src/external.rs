//! LLM-backed classifier over a chat-completion endpoint.

use crate::parse::parse_decision;
use async_trait::async_trait;
use reqwest::Client;
use router_classify::Classifier;
use router_core::{DecisionContext, RouterError, RouterResult, RoutingDecision};
use router_resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig, RetryPolicy};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a routing assistant. Respond ONLY with a JSON object containing: service (string), confidence (0.0-1.0), explanation (string).";

/// External classifier configuration.
#[derive(Debug, Clone)]
pub struct ExternalClassifierConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// API key sent as a bearer token.
    pub api_key: SecretString,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Initial retry backoff.
    pub backoff: Duration,
    /// Cancellation token checked before each attempt issues I/O.
    pub cancellation: Option<CancellationToken>,
}

impl ExternalClassifierConfig {
    /// Create a configuration with the stock defaults for an API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: SecretString::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            backoff: Duration::from_millis(500),
            cancellation: None,
        }
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Classifier that delegates the decision to an external language model.
///
/// Two resilience policies compose around every call: retry (transport
/// errors, 429, 5xx) inside a circuit breaker, where the breaker records
/// one observation per logical call regardless of attempts.
pub struct ExternalClassifier {
    config: ExternalClassifierConfig,
    client: Client,
    retry: RetryPolicy,
    breaker: CircuitBreaker,
}

impl ExternalClassifier {
    /// Create an external classifier.
    ///
    /// # Errors
    /// Returns `Configuration` if the API key is blank, the endpoint is
    /// not a valid URL, or the HTTP client cannot be constructed.
    pub fn new(config: ExternalClassifierConfig) -> RouterResult<Self> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(RouterError::configuration(
                "external classifier requires an API key",
            ));
        }
        url::Url::parse(&config.endpoint).map_err(|e| {
            RouterError::configuration(format!("invalid endpoint '{}': {e}", config.endpoint))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RouterError::internal(format!("failed to create HTTP client: {e}")))?;

        let retry = RetryPolicy::new(RetryConfig {
            max_retries: config.max_retries,
            initial_delay: config.backoff,
            ..Default::default()
        });
        let breaker = CircuitBreaker::new("external-llm", CircuitBreakerConfig::default());

        Ok(Self {
            config,
            client,
            retry,
            breaker,
        })
    }

    /// Create with a custom breaker configuration (tests shrink the
    /// window).
    ///
    /// # Errors
    /// Same conditions as [`ExternalClassifier::new`].
    pub fn with_breaker(
        config: ExternalClassifierConfig,
        breaker_config: CircuitBreakerConfig,
    ) -> RouterResult<Self> {
        let mut classifier = Self::new(config)?;
        classifier.breaker = CircuitBreaker::new("external-llm", breaker_config);
        Ok(classifier)
    }

    /// The breaker guarding this classifier.
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn build_request(&self, context: &DecisionContext) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Route the following request to the best matching service: \n\n{}",
                        context.payload()
                    ),
                },
            ],
            temperature: self.config.temperature,
        }
    }

    async fn attempt(&self, context: &DecisionContext, attempt: u32) -> RouterResult<RoutingDecision> {
        if let Some(token) = &self.config.cancellation {
            if token.is_cancelled() {
                return Err(RouterError::Cancelled);
            }
        }

        debug!(attempt, model = %self.config.model, "external classification attempt");
        let request = self.build_request(context);
        let send = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send();

        let response = match &self.config.cancellation {
            Some(token) => tokio::select! {
                () = token.cancelled() => return Err(RouterError::Cancelled),
                result = send => result,
            },
            None => send.await,
        };

        let response = response.map_err(|e| {
            let retryable = e.is_timeout() || e.is_connect() || e.is_request();
            RouterError::llm_provider_caused_by("transport error", None, retryable, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouterError::llm_provider(
                format!("endpoint returned {status}: {body}"),
                Some(status.as_u16()),
                false,
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            RouterError::llm_provider_caused_by("malformed completion payload", None, false, e)
        })?;

        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| {
                RouterError::llm_provider("completion has no message content", None, false)
            })?;

        parse_decision(content)
    }
}

#[async_trait]
impl Classifier for ExternalClassifier {
    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        if let Err(rejected) = self.breaker.check() {
            warn!(breaker = self.breaker.name(), "rejecting call, circuit open");
            return Err(RouterError::llm_provider_caused_by(
                "external classifier circuit is open",
                None,
                false,
                rejected,
            ));
        }

        let outcome = self.retry.execute(|attempt| self.attempt(context, attempt)).await;
        // Cancellation is the caller's doing, not downstream health.
        if !matches!(outcome, Err(RouterError::Cancelled)) {
            self.breaker.record(outcome.is_ok());
        }
        outcome
    }

    fn name(&self) -> &str {
        "external-llm"
    }

    fn is_available(&self) -> bool {
        self.breaker.state() != CircuitState::Open
    }
}

impl std::fmt::Debug for ExternalClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalClassifier")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    fn config(server: &MockServer) -> ExternalClassifierConfig {
        ExternalClassifierConfig::new("test-key")
            .with_endpoint(format!("{}/v1/chat/completions", server.uri()))
            .with_retries(2, Duration::from_millis(1))
    }

    fn ctx(payload: &str) -> DecisionContext {
        DecisionContext::new(payload).unwrap()
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let result = ExternalClassifier::new(ExternalClassifierConfig::new("  "));
        assert!(matches!(result, Err(RouterError::Configuration { .. })));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = ExternalClassifierConfig::new("key").with_endpoint("not a url");
        assert!(ExternalClassifier::new(config).is_err());
    }

    #[tokio::test]
    async fn test_successful_decision() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"service": "auth-service", "confidence": 0.9, "explanation": "login"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let classifier = ExternalClassifier::new(config(&server)).unwrap();
        let decision = classifier.decide(&ctx("log me in")).await.unwrap();

        assert_eq!(decision.service(), "auth-service");
        assert!((decision.confidence() - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_retries_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"service": "user-service", "confidence": 0.7, "explanation": "profile"}"#,
            )))
            .mount(&server)
            .await;

        let classifier = ExternalClassifier::new(config(&server)).unwrap();
        let decision = classifier.decide(&ctx("show my profile")).await.unwrap();
        assert_eq!(decision.service(), "user-service");
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3) // initial + 2 retries
            .mount(&server)
            .await;

        let classifier = ExternalClassifier::new(config(&server)).unwrap();
        let err = classifier.decide(&ctx("anything")).await.unwrap_err();
        assert!(matches!(
            err,
            RouterError::LlmProvider {
                status_code: Some(500),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let classifier = ExternalClassifier::new(config(&server)).unwrap();
        let err = classifier.decide(&ctx("anything")).await.unwrap_err();
        assert!(matches!(err, RouterError::LlmProvider { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_content_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("no json here")),
            )
            .mount(&server)
            .await;

        let classifier = ExternalClassifier::new(config(&server)).unwrap();
        let err = classifier.decide(&ctx("anything")).await.unwrap_err();
        assert!(matches!(err, RouterError::LlmProvider { .. }));
    }

    #[tokio::test]
    async fn test_breaker_opens_after_repeated_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let breaker_config = router_resilience::CircuitBreakerConfig {
            window_size: 4,
            failure_rate_threshold: 0.5,
            min_calls: 2,
            open_timeout: Duration::from_secs(30),
            success_threshold: 1,
        };
        let classifier =
            ExternalClassifier::with_breaker(config(&server), breaker_config).unwrap();

        // Two failed logical calls trip the breaker.
        assert!(classifier.decide(&ctx("one")).await.is_err());
        assert!(classifier.decide(&ctx("two")).await.is_err());
        assert!(!classifier.is_available());

        // The third call is rejected without touching the network.
        let requests_before = server.received_requests().await.unwrap().len();
        let err = classifier.decide(&ctx("three")).await.unwrap_err();
        assert!(matches!(err, RouterError::LlmProvider { .. }));
        let requests_after = server.received_requests().await.unwrap().len();
        assert_eq!(requests_before, requests_after);
    }

    #[tokio::test]
    async fn test_cancellation_stops_before_io() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                r#"{"service": "auth-service", "confidence": 0.9}"#,
            )))
            .expect(0)
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let classifier = ExternalClassifier::new(
            config(&server).with_cancellation(token),
        )
        .unwrap();

        let err = classifier.decide(&ctx("anything")).await.unwrap_err();
        assert!(matches!(err, RouterError::Cancelled));
    }
}
