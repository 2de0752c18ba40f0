//! Keyword-first tiered classification.

use async_trait::async_trait;
use router_classify::{Classifier, KeywordMatcher};
use router_core::{DecisionContext, RouterResult, RoutingDecision};
use std::sync::Arc;
use tracing::debug;

/// Tiered classifier: keyword matching first, an optional semantic tier
/// second, a final classifier last.
///
/// Each tier yields to the next only when its confidence falls below that
/// tier's threshold. The semantic tier is a plug-in slot; with no semantic
/// backend configured the chain is keyword then final.
pub struct TieredClassifier {
    matcher: Arc<KeywordMatcher>,
    keyword_threshold: f64,
    semantic: Option<Arc<dyn Classifier>>,
    semantic_threshold: f64,
    fallback: Arc<dyn Classifier>,
}

impl TieredClassifier {
    /// Create a tiered classifier with the default thresholds
    /// (keyword 0.8, semantic 0.7).
    #[must_use]
    pub fn new(matcher: Arc<KeywordMatcher>, fallback: Arc<dyn Classifier>) -> Self {
        Self {
            matcher,
            keyword_threshold: 0.8,
            semantic: None,
            semantic_threshold: 0.7,
            fallback,
        }
    }

    /// Set the keyword tier threshold.
    #[must_use]
    pub fn with_keyword_threshold(mut self, threshold: f64) -> Self {
        self.keyword_threshold = threshold;
        self
    }

    /// Plug in a semantic tier with its threshold.
    #[must_use]
    pub fn with_semantic(mut self, classifier: Arc<dyn Classifier>, threshold: f64) -> Self {
        self.semantic = Some(classifier);
        self.semantic_threshold = threshold;
        self
    }
}

#[async_trait]
impl Classifier for TieredClassifier {
    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        let keyword_decision = self.matcher.find_best_match(context.payload());
        if keyword_decision.confidence() >= self.keyword_threshold {
            debug!(
                confidence = keyword_decision.confidence(),
                "keyword tier accepted"
            );
            return Ok(keyword_decision);
        }

        if let Some(semantic) = &self.semantic {
            let semantic_decision = semantic.decide(context).await?;
            if semantic_decision.confidence() >= self.semantic_threshold {
                debug!(
                    confidence = semantic_decision.confidence(),
                    "semantic tier accepted"
                );
                return Ok(semantic_decision);
            }
        }

        debug!("falling through to final classifier");
        self.fallback.decide(context).await
    }

    fn name(&self) -> &str {
        "tiered"
    }

    fn is_available(&self) -> bool {
        self.fallback.is_available()
    }
}

impl std::fmt::Debug for TieredClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredClassifier")
            .field("keyword_threshold", &self.keyword_threshold)
            .field("has_semantic", &self.semantic.is_some())
            .finish()
    }
}
