//! Routing decision and result value types.

use crate::error::{RouterError, RouterResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single-service routing decision produced inside the router.
///
/// Confidence is always normalized into `[0, 1]`; a non-finite value
/// collapses to `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    service: String,
    confidence: f64,
    explanation: String,
}

impl RoutingDecision {
    /// Create a decision, validating the service id and normalizing
    /// confidence.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the service id is blank.
    pub fn new(
        service: impl Into<String>,
        confidence: f64,
        explanation: impl Into<String>,
    ) -> RouterResult<Self> {
        let service = service.into();
        if service.trim().is_empty() {
            return Err(RouterError::invalid_input(
                "decision service id must not be blank",
            ));
        }
        Ok(Self {
            service,
            confidence: normalize_confidence(confidence),
            explanation: explanation.into(),
        })
    }

    /// The chosen downstream service id.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Normalized confidence in `[0, 1]`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Human-readable explanation of how the decision was made.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Copy of this decision pointing at a different service, keeping the
    /// original confidence. Used by the threshold-fallback and A/B paths.
    #[must_use]
    pub fn redirected(&self, service: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            confidence: self.confidence,
            explanation: explanation.into(),
        }
    }
}

fn normalize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// The externally observable outcome of one routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    decision: RoutingDecision,
    processing_time_ms: u64,
    timestamp: DateTime<Utc>,
}

impl RoutingResult {
    /// Create a result stamped with the current wall clock.
    ///
    /// Negative elapsed values (a clock that went backwards between ingest
    /// and emit) are coerced to zero.
    #[must_use]
    pub fn new(decision: RoutingDecision, processing_time_ms: i64) -> Self {
        Self {
            decision,
            processing_time_ms: processing_time_ms.max(0) as u64,
            timestamp: Utc::now(),
        }
    }

    /// The routing decision.
    #[must_use]
    pub fn decision(&self) -> &RoutingDecision {
        &self.decision
    }

    /// Convenience accessor for the decided service id.
    #[must_use]
    pub fn service(&self) -> &str {
        self.decision.service()
    }

    /// Convenience accessor for the decision confidence.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.decision.confidence()
    }

    /// Elapsed wall time of the routing call, in milliseconds.
    #[must_use]
    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    /// Wall-clock timestamp taken at emit.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
