//! The hybrid dispatcher.
//!
//! One decision function layered in a fixed order: validate, pick an
//! engine by complexity, apply the confidence-threshold fallback, apply
//! the A/B split, emit. Timing starts at ingest and the timestamp is
//! stamped at emit.

use crate::ab::AbSplitter;
use router_classify::{Classifier, ComplexityAnalyzer};
use router_core::{
    DecisionContext, InputValidator, RouterError, RouterResult, RoutingDecision, RoutingResult,
};
use router_graph::pathfinder::TARGET_PREFIX;
use router_graph::{DijkstraPathfinder, PathCache};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Confidence-threshold fallback settings.
#[derive(Debug, Clone)]
pub struct ThresholdFallback {
    /// Decisions below this confidence are rewritten or rejected.
    pub min_confidence: f64,
    /// Rewrite target; without one the layer only logs.
    pub fallback_service: Option<String>,
    /// Reject with `LowConfidence` instead of rewriting.
    pub strict: bool,
}

/// Top-level routing decision function.
pub struct HybridDispatcher {
    validator: InputValidator,
    analyzer: ComplexityAnalyzer,
    classifier: Arc<dyn Classifier>,
    pathfinder: Option<Arc<DijkstraPathfinder>>,
    cache: Option<Arc<PathCache>>,
    threshold: Option<ThresholdFallback>,
    ab: Option<AbSplitter>,
}

impl HybridDispatcher {
    /// Start building a dispatcher around a classifier.
    #[must_use]
    pub fn builder(classifier: Arc<dyn Classifier>) -> DispatcherBuilder {
        DispatcherBuilder {
            classifier,
            pathfinder: None,
            cache: None,
            threshold: None,
            ab: None,
        }
    }

    /// Route a single request.
    ///
    /// # Errors
    /// Propagates validation failures, classifier errors, and pure path
    /// failures (`NoTarget`, `UnknownTarget`, `NoPath`); in strict mode a
    /// low-confidence decision surfaces as `LowConfidence`.
    pub async fn dispatch(&self, text: &str) -> RouterResult<RoutingResult> {
        let started = Instant::now();
        let request_id = Uuid::new_v4();
        let span = info_span!("route", request_id = %request_id);

        async {
            self.validator.validate(text)?;
            let context = DecisionContext::new(text)?;

            let decision = self.decide(&context).await?;
            let decision = self.apply_threshold(decision)?;
            let decision = match &self.ab {
                Some(splitter) => splitter.apply(decision),
                None => decision,
            };

            let elapsed_ms = started.elapsed().as_millis() as i64;
            info!(
                service = decision.service(),
                confidence = decision.confidence(),
                elapsed_ms,
                "request routed"
            );
            Ok(RoutingResult::new(decision, elapsed_ms))
        }
        .instrument(span)
        .await
    }

    async fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        let complexity = self.analyzer.classify(context);
        // An explicit target prefix always names a graph destination, even
        // when the analyzer calls the request simple.
        let explicit_target = context.payload_lower().starts_with(TARGET_PREFIX);

        if let Some(pathfinder) = &self.pathfinder {
            if complexity.uses_pathfinder() || explicit_target {
                debug!(complexity = %complexity, "dispatching through pathfinder");
                return self.route_through_graph(pathfinder, context);
            }
        }

        debug!(
            complexity = %complexity,
            classifier = self.classifier.name(),
            "dispatching through classifier"
        );
        self.classifier.decide(context).await
    }

    fn route_through_graph(
        &self,
        pathfinder: &Arc<DijkstraPathfinder>,
        context: &DecisionContext,
    ) -> RouterResult<RoutingDecision> {
        match &self.cache {
            Some(cache) => {
                cache.get_or_compute(context.payload(), || pathfinder.decide(context))
            }
            None => pathfinder.decide(context),
        }
    }

    fn apply_threshold(&self, decision: RoutingDecision) -> RouterResult<RoutingDecision> {
        let Some(threshold) = &self.threshold else {
            return Ok(decision);
        };
        if decision.confidence() >= threshold.min_confidence {
            return Ok(decision);
        }
        if threshold.strict {
            return Err(RouterError::LowConfidence {
                service: decision.service().to_string(),
                confidence: decision.confidence(),
                threshold: threshold.min_confidence,
            });
        }
        let Some(fallback) = &threshold.fallback_service else {
            debug!(
                service = decision.service(),
                confidence = decision.confidence(),
                "decision below threshold, no fallback configured"
            );
            return Ok(decision);
        };
        info!(
            original = decision.service(),
            confidence = decision.confidence(),
            fallback = %fallback,
            "rewriting low-confidence decision"
        );
        let explanation = format!(
            "Fallback from '{}' (confidence {:.2} below threshold {:.2}): {}",
            decision.service(),
            decision.confidence(),
            threshold.min_confidence,
            decision.explanation()
        );
        Ok(decision.redirected(fallback.clone(), explanation))
    }
}

impl std::fmt::Debug for HybridDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridDispatcher")
            .field("classifier", &self.classifier.name())
            .field("graph", &self.pathfinder.is_some())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

/// Builder for [`HybridDispatcher`].
pub struct DispatcherBuilder {
    classifier: Arc<dyn Classifier>,
    pathfinder: Option<Arc<DijkstraPathfinder>>,
    cache: Option<Arc<PathCache>>,
    threshold: Option<ThresholdFallback>,
    ab: Option<AbSplitter>,
}

impl DispatcherBuilder {
    /// Enable the graph engine.
    #[must_use]
    pub fn pathfinder(mut self, pathfinder: Arc<DijkstraPathfinder>) -> Self {
        self.pathfinder = Some(pathfinder);
        self
    }

    /// Cache graph decisions.
    #[must_use]
    pub fn cache(mut self, cache: Arc<PathCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Enable the confidence-threshold layer.
    #[must_use]
    pub fn threshold(mut self, threshold: ThresholdFallback) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Enable A/B splitting.
    #[must_use]
    pub fn ab_splitter(mut self, splitter: AbSplitter) -> Self {
        self.ab = Some(splitter);
        self
    }

    /// Build the dispatcher.
    #[must_use]
    pub fn build(self) -> HybridDispatcher {
        HybridDispatcher {
            validator: InputValidator::new(),
            analyzer: ComplexityAnalyzer::new(),
            classifier: self.classifier,
            pathfinder: self.pathfinder,
            cache: self.cache,
            threshold: self.threshold,
            ab: self.ab,
        }
    }
}
