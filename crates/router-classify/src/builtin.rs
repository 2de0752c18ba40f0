//! Keyword-backed classifier.

use crate::classifier::Classifier;
use crate::matcher::KeywordMatcher;
use async_trait::async_trait;
use router_core::{DecisionContext, RouterResult, RoutingDecision};
use std::sync::Arc;
use tracing::debug;

/// Classifier over the scored keyword matcher. CPU-only and infallible.
#[derive(Debug)]
pub struct BuiltinClassifier {
    matcher: Arc<KeywordMatcher>,
}

impl BuiltinClassifier {
    /// Create a classifier over a shared matcher.
    #[must_use]
    pub fn new(matcher: Arc<KeywordMatcher>) -> Self {
        Self { matcher }
    }

    /// The underlying matcher.
    #[must_use]
    pub fn matcher(&self) -> &Arc<KeywordMatcher> {
        &self.matcher
    }
}

#[async_trait]
impl Classifier for BuiltinClassifier {
    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        let decision = self.matcher.find_best_match(context.payload());
        debug!(
            service = decision.service(),
            confidence = decision.confidence(),
            "builtin classifier decision"
        );
        Ok(decision)
    }

    fn name(&self) -> &str {
        "builtin-keyword"
    }
}
