//! Routing paths produced by the graph pathfinder.

use crate::error::{RouterError, RouterResult};
use serde::{Deserialize, Serialize};

/// An ordered path through the service graph, source first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingPath {
    services: Vec<String>,
    total_cost: f64,
    estimated_latency: f64,
}

impl RoutingPath {
    /// Create a path from an ordered service list and derived metrics.
    ///
    /// The service list is copied; later mutation of the caller's vector
    /// does not affect the path.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the list is empty or either metric is
    /// negative.
    pub fn new(
        services: &[String],
        total_cost: f64,
        estimated_latency: f64,
    ) -> RouterResult<Self> {
        if services.is_empty() {
            return Err(RouterError::invalid_input(
                "routing path must contain at least one service",
            ));
        }
        if total_cost < 0.0 || !total_cost.is_finite() {
            return Err(RouterError::invalid_input("path cost must be non-negative"));
        }
        if estimated_latency < 0.0 || !estimated_latency.is_finite() {
            return Err(RouterError::invalid_input(
                "path latency must be non-negative",
            ));
        }
        Ok(Self {
            services: services.to_vec(),
            total_cost,
            estimated_latency,
        })
    }

    /// The ordered service ids, source first.
    #[must_use]
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// The first hop of the path.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.services[0]
    }

    /// The final hop of the path.
    #[must_use]
    pub fn target(&self) -> &str {
        self.services
            .last()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Number of edges in the path.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.services.len() - 1
    }

    /// Derived total cost.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Derived latency estimate in milliseconds.
    #[must_use]
    pub fn estimated_latency(&self) -> f64 {
        self.estimated_latency
    }
}
