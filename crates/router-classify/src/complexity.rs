//! Request complexity analysis.
//!
//! Lexical signals pick the decision engine for a request. The precedence
//! is load-bearing: an explicit target prefix is inspected first, and cost
//! signals outrank multi-hop signals.

use once_cell::sync::Lazy;
use regex::Regex;
use router_core::DecisionContext;
use tracing::trace;

/// The complexity classes a request can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestComplexity {
    /// Single-service request, handled by a classifier.
    Simple,
    /// Multi-step request, routed through the pathfinder.
    MultiHop,
    /// Cost-sensitive request, routed through the pathfinder.
    CostSensitive,
    /// Resilience-focused request, routed through the pathfinder.
    Failover,
}

impl RequestComplexity {
    /// Whether this class routes through the graph pathfinder.
    #[must_use]
    pub fn uses_pathfinder(self) -> bool {
        !matches!(self, Self::Simple)
    }
}

impl std::fmt::Display for RequestComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Simple => "simple",
            Self::MultiHop => "multi_hop",
            Self::CostSensitive => "cost_sensitive",
            Self::Failover => "failover",
        };
        write!(f, "{name}")
    }
}

static MULTI_HOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(and then|after|followed by|before|chain|orchestrate|workflow)\b").unwrap()
});

// `minimiz` is a stem (minimize, minimizing), so it only gets the left
// boundary.
static COST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(cheap|cheapest|expensive|cost|budget|optimize)\b|\bminimiz").unwrap()
});

static FAILOVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(failover|backup|alternative|fallback|retry)\b").unwrap());

/// Stateless complexity analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexityAnalyzer;

impl ComplexityAnalyzer {
    /// Create an analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classify a request.
    #[must_use]
    pub fn classify(&self, context: &DecisionContext) -> RequestComplexity {
        let payload = context.payload_lower();

        let complexity = if payload.starts_with("target:") {
            if MULTI_HOP.is_match(&payload) {
                RequestComplexity::MultiHop
            } else {
                RequestComplexity::Simple
            }
        } else if COST.is_match(&payload) {
            RequestComplexity::CostSensitive
        } else if MULTI_HOP.is_match(&payload) {
            RequestComplexity::MultiHop
        } else if FAILOVER.is_match(&payload) {
            RequestComplexity::Failover
        } else {
            RequestComplexity::Simple
        };

        trace!(complexity = %complexity, "request classified");
        complexity
    }
}
