//! Edge metrics and the derived edge weight.

use router_core::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};

/// Weight contribution of a millisecond of latency.
const LATENCY_FACTOR: f64 = 0.5;
/// Weight contribution of a unit of cost.
const COST_FACTOR: f64 = 0.3;
/// Weight contribution of the unreliability term.
const UNRELIABILITY_FACTOR: f64 = 0.2;
/// Scale applied to the unreliability term.
const UNRELIABILITY_SCALE: f64 = 1000.0;

/// The `(latency, cost, reliability)` tuple attached to a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetrics {
    latency_ms: f64,
    cost: f64,
    reliability: f64,
}

impl EdgeMetrics {
    /// Create metrics, validating each field.
    ///
    /// # Errors
    /// Returns `Configuration` if latency or cost is negative or
    /// reliability falls outside `[0, 1]`.
    pub fn new(latency_ms: f64, cost: f64, reliability: f64) -> RouterResult<Self> {
        if !latency_ms.is_finite() || latency_ms < 0.0 {
            return Err(RouterError::configuration(format!(
                "edge latency must be non-negative, got {latency_ms}"
            )));
        }
        if !cost.is_finite() || cost < 0.0 {
            return Err(RouterError::configuration(format!(
                "edge cost must be non-negative, got {cost}"
            )));
        }
        if !reliability.is_finite() || !(0.0..=1.0).contains(&reliability) {
            return Err(RouterError::configuration(format!(
                "edge reliability must be within [0, 1], got {reliability}"
            )));
        }
        Ok(Self {
            latency_ms,
            cost,
            reliability,
        })
    }

    /// Expected call latency in milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    /// Monetary cost per call.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Success probability in `[0, 1]`.
    #[must_use]
    pub fn reliability(&self) -> f64 {
        self.reliability
    }

    /// Copy of these metrics with a different reliability.
    ///
    /// # Errors
    /// Returns `Configuration` if the reliability is out of range.
    pub fn with_reliability(&self, reliability: f64) -> RouterResult<Self> {
        Self::new(self.latency_ms, self.cost, reliability)
    }

    /// The Dijkstra edge weight:
    /// `0.5 * latency + 0.3 * cost + 0.2 * (1 - reliability) * 1000`.
    ///
    /// The constants are part of the routing contract; derived path
    /// metrics only line up across deployments when every router computes
    /// the same weights.
    #[must_use]
    pub fn weight(&self) -> f64 {
        LATENCY_FACTOR * self.latency_ms
            + COST_FACTOR * self.cost
            + UNRELIABILITY_FACTOR * (1.0 - self.reliability) * UNRELIABILITY_SCALE
    }
}
