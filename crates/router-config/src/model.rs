//! The router configuration model.

use router_core::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Which classifier serves simple requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// The keyword-backed classifier.
    #[default]
    Builtin,
    /// The external LLM classifier.
    External,
    /// External first, builtin as the fallback chain.
    Hybrid,
}

/// One registry service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ServiceConfig {
    /// Unique service id.
    #[validate(length(min = 1))]
    pub id: String,
    /// Human-readable display name.
    #[serde(default)]
    pub display_name: String,
    /// Keywords routed to this service.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One directed graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EdgeConfig {
    /// Source node id.
    #[validate(length(min = 1))]
    pub from: String,
    /// Destination node id.
    #[validate(length(min = 1))]
    pub to: String,
    /// Expected latency in milliseconds.
    pub latency: f64,
    /// Monetary cost per call.
    #[serde(default)]
    pub cost: f64,
    /// Success probability in `[0, 1]`.
    #[validate(range(min = 0.0, max = 1.0))]
    pub reliability: f64,
}

/// Decision cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether the cache is used at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of live entries.
    #[serde(default = "default_cache_size")]
    pub max_size: usize,
    /// Per-entry lifetime in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: default_cache_size(),
            ttl_ms: default_cache_ttl_ms(),
        }
    }
}

/// Graph subsystem settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Whether the Dijkstra subsystem is active.
    #[serde(default)]
    pub enabled: bool,
    /// Source node of every search.
    #[serde(default = "default_graph_source")]
    pub source: String,
    /// The edge set.
    #[serde(default)]
    pub edges: Vec<EdgeConfig>,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source: default_graph_source(),
            edges: Vec::new(),
            cache: CacheConfig::default(),
        }
    }
}

/// External classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// API key for the chat-completion endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Endpoint URL.
    #[serde(default = "default_external_endpoint")]
    pub endpoint: String,
    /// Model identifier.
    #[serde(default = "default_external_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f64,
    /// Retries after the first attempt.
    #[serde(default = "default_external_retries")]
    pub max_retries: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_external_timeout_ms")]
    pub timeout_ms: u64,
    /// Initial retry backoff in milliseconds.
    #[serde(default = "default_external_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_external_endpoint(),
            model: default_external_model(),
            temperature: 0.0,
            max_retries: default_external_retries(),
            timeout_ms: default_external_timeout_ms(),
            backoff_ms: default_external_backoff_ms(),
        }
    }
}

/// One A/B test entry, keyed by the originally decided service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AbTestConfig {
    /// Service receiving the test traffic.
    #[validate(length(min = 1))]
    pub test_service: String,
    /// Probability of redirecting a decision.
    #[validate(range(min = 0.0, max = 1.0))]
    pub probability: f64,
}

/// Tiered-routing thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Whether tiered routing is active.
    #[serde(default)]
    pub enabled: bool,
    /// Keyword tier yields below this confidence.
    #[serde(default = "default_keyword_threshold")]
    pub keyword_threshold: f64,
    /// Semantic tier yields below this confidence.
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keyword_threshold: default_keyword_threshold(),
            semantic_threshold: default_semantic_threshold(),
        }
    }
}

/// Top-level router configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouterConfig {
    /// Which classifier serves simple requests.
    #[serde(default)]
    pub classifier: ClassifierKind,
    /// Confidence floor for the threshold-fallback layer.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Service decisions are rewritten to when they fall below the floor.
    /// The threshold layer rewrites only when this is set.
    #[serde(default)]
    pub fallback_service: Option<String>,
    /// Surface `LowConfidence` errors instead of rewriting.
    #[serde(default)]
    pub strict: bool,
    /// Registry services.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Graph subsystem settings.
    #[serde(default)]
    pub graph: GraphConfig,
    /// External classifier settings.
    #[serde(default)]
    pub external: ExternalConfig,
    /// A/B tests, keyed by the originally decided service.
    #[serde(default)]
    pub ab_tests: HashMap<String, AbTestConfig>,
    /// Tiered-routing settings.
    #[serde(default)]
    pub tiers: TierConfig,
}

impl RouterConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `Configuration` on the first violated invariant.
    pub fn validate(&self) -> RouterResult<()> {
        for service in &self.services {
            if service.id.trim().is_empty() {
                return Err(RouterError::configuration("service id must not be blank"));
            }
            if service.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(RouterError::configuration(format!(
                    "service '{}' has a blank keyword",
                    service.id
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RouterError::configuration(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if self.graph.enabled {
            if self.graph.source.trim().is_empty() {
                return Err(RouterError::configuration(
                    "graph.source must not be blank when the graph is enabled",
                ));
            }
            if self.graph.edges.is_empty() {
                return Err(RouterError::configuration(
                    "graph.edges must not be empty when the graph is enabled",
                ));
            }
            if !self
                .graph
                .edges
                .iter()
                .any(|edge| edge.from == self.graph.source)
            {
                return Err(RouterError::configuration(format!(
                    "graph.source '{}' has no outgoing edges",
                    self.graph.source
                )));
            }
            for edge in &self.graph.edges {
                edge.validate().map_err(|e| {
                    RouterError::configuration(format!(
                        "invalid edge {} -> {}: {e}",
                        edge.from, edge.to
                    ))
                })?;
                if edge.latency < 0.0 || edge.cost < 0.0 {
                    return Err(RouterError::configuration(format!(
                        "edge {} -> {} has negative metrics",
                        edge.from, edge.to
                    )));
                }
            }
        }

        if matches!(
            self.classifier,
            ClassifierKind::External | ClassifierKind::Hybrid
        ) && self.external.api_key.trim().is_empty()
        {
            return Err(RouterError::configuration(
                "external classifier requires external.api_key",
            ));
        }

        for (original, test) in &self.ab_tests {
            if original.trim().is_empty() || test.test_service.trim().is_empty() {
                return Err(RouterError::configuration(
                    "ab_tests entries must name both services",
                ));
            }
            if !(0.0..=1.0).contains(&test.probability) {
                return Err(RouterError::configuration(format!(
                    "ab_tests probability for '{original}' must be within [0, 1]"
                )));
            }
        }

        if let Some(fallback) = &self.fallback_service {
            if fallback.trim().is_empty() {
                return Err(RouterError::configuration(
                    "fallback_service must not be blank when set",
                ));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_size() -> usize {
    1000
}

fn default_cache_ttl_ms() -> u64 {
    300_000
}

fn default_graph_source() -> String {
    "gateway".to_string()
}

fn default_external_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_external_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_external_retries() -> u32 {
    2
}

fn default_external_timeout_ms() -> u64 {
    30_000
}

fn default_external_backoff_ms() -> u64 {
    500
}

fn default_confidence_threshold() -> f64 {
    0.7
}

fn default_keyword_threshold() -> f64 {
    0.8
}

fn default_semantic_threshold() -> f64 {
    0.7
}
