//! Error types for the service router.
//!
//! A single caller-facing taxonomy covers every component: validation,
//! pathfinding, the external classifier, and configuration. Component-local
//! failures that are recoverable (a keyword whose pattern fails to compile)
//! are logged and skipped instead of surfacing here.

use std::time::Duration;
use thiserror::Error;

/// Result alias used across the router crates.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors surfaced to the caller of the router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The request payload was rejected by validation.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Why the payload was rejected.
        reason: String,
    },

    /// The pathfinding target is not present in the service graph.
    #[error("unknown target service '{target}'")]
    UnknownTarget {
        /// The requested target id.
        target: String,
    },

    /// No target service could be inferred from the payload.
    #[error("no target service could be inferred from the request")]
    NoTarget,

    /// The target is unreachable from the configured source.
    #[error("no path from '{from_node}' to '{target}'")]
    NoPath {
        /// Source node of the search.
        from_node: String,
        /// Unreachable target node.
        target: String,
    },

    /// The external classifier failed after all retries.
    #[error("llm provider error: {message}")]
    LlmProvider {
        /// Description of the failure.
        message: String,
        /// HTTP status of the final attempt, when one was received.
        status_code: Option<u16>,
        /// Whether the failure class is worth retrying.
        retryable: bool,
        /// The underlying cause, preserved for diagnostics.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A circuit breaker is open and rejecting calls.
    #[error("circuit breaker '{name}' is open")]
    CircuitOpen {
        /// Breaker identifier.
        name: String,
    },

    /// An operation exceeded its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid settings detected at startup.
    #[error("configuration error: {message}")]
    Configuration {
        /// What is wrong with the settings.
        message: String,
    },

    /// Strict mode: a decision fell below the configured confidence floor.
    #[error("decision for '{service}' has confidence {confidence:.2} below threshold {threshold:.2}")]
    LowConfidence {
        /// The service the decision named.
        service: String,
        /// The decision's confidence.
        confidence: f64,
        /// The configured floor.
        threshold: f64,
    },

    /// Unexpected internal failure.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl RouterError {
    /// Create an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an `UnknownTarget` error.
    pub fn unknown_target(target: impl Into<String>) -> Self {
        Self::UnknownTarget {
            target: target.into(),
        }
    }

    /// Create a `NoPath` error.
    pub fn no_path(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::NoPath {
            from_node: source.into(),
            target: target.into(),
        }
    }

    /// Create an `LlmProvider` error without an underlying cause.
    pub fn llm_provider(
        message: impl Into<String>,
        status_code: Option<u16>,
        retryable: bool,
    ) -> Self {
        Self::LlmProvider {
            message: message.into(),
            status_code,
            retryable,
            source: None,
        }
    }

    /// Create an `LlmProvider` error that preserves the underlying cause.
    pub fn llm_provider_caused_by(
        message: impl Into<String>,
        status_code: Option<u16>,
        retryable: bool,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::LlmProvider {
            message: message.into(),
            status_code,
            retryable,
            source: Some(Box::new(source)),
        }
    }

    /// Create a `CircuitOpen` error.
    pub fn circuit_open(name: impl Into<String>) -> Self {
        Self::CircuitOpen { name: name.into() }
    }

    /// Create a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the failed operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LlmProvider {
                retryable,
                status_code,
                ..
            } => {
                *retryable
                    || status_code
                        .is_some_and(|code| code == 429 || (500..=599).contains(&code))
            }
            Self::Timeout(_) => true,
            _ => false,
        }
    }

    /// Short machine-readable kind, used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::UnknownTarget { .. } => "unknown_target",
            Self::NoTarget => "no_target",
            Self::NoPath { .. } => "no_path",
            Self::LlmProvider { .. } => "llm_provider",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
            Self::Configuration { .. } => "configuration",
            Self::LowConfidence { .. } => "low_confidence",
            Self::Internal { .. } => "internal",
        }
    }
}
