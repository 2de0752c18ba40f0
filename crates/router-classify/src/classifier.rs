//! The classifier capability.

use async_trait::async_trait;
use router_core::{DecisionContext, RouterResult, RoutingDecision};

/// Any component that produces a single-service routing decision from a
/// validated request.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Produce a routing decision for the request.
    ///
    /// # Errors
    /// Implementations surface their own failure modes; the external
    /// classifier reports `LlmProvider` after exhausting retries.
    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision>;

    /// Stable name used in logs and explanations.
    fn name(&self) -> &str;

    /// Whether the classifier is currently able to serve decisions.
    fn is_available(&self) -> bool {
        true
    }
}
