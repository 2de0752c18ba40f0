//! A/B splitting of routing decisions.

use rand::Rng;
use router_core::RoutingDecision;
use std::collections::HashMap;
use tracing::debug;

/// Source of uniform random numbers in `[0, 1)`.
///
/// The seam exists so tests can drive the split deterministically.
pub trait RandomSource: Send + Sync {
    /// Next uniform sample in `[0, 1)`.
    fn next_f64(&self) -> f64;
}

/// Thread-local RNG source used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// One A/B variant: where the test traffic goes and how much of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AbVariant {
    /// Service receiving the test traffic.
    pub test_service: String,
    /// Probability of redirecting a decision, in `[0, 1]`.
    pub probability: f64,
}

/// Post-decision A/B splitter.
///
/// After a decision is produced, a configured entry for the decided
/// service redirects it to the test service with the entry's probability.
pub struct AbSplitter {
    variants: HashMap<String, AbVariant>,
    random: Box<dyn RandomSource>,
}

impl AbSplitter {
    /// Create a splitter using thread-local randomness.
    #[must_use]
    pub fn new(variants: HashMap<String, AbVariant>) -> Self {
        Self::with_random(variants, Box::new(ThreadRngSource))
    }

    /// Create a splitter with an explicit random source.
    #[must_use]
    pub fn with_random(
        variants: HashMap<String, AbVariant>,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self { variants, random }
    }

    /// Whether any variants are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Apply the split to a decision.
    #[must_use]
    pub fn apply(&self, decision: RoutingDecision) -> RoutingDecision {
        let Some(variant) = self.variants.get(decision.service()) else {
            return decision;
        };
        if self.random.next_f64() >= variant.probability {
            return decision;
        }
        let percent = (variant.probability * 100.0).round() as u32;
        debug!(
            original = decision.service(),
            test = %variant.test_service,
            percent,
            "A/B redirect"
        );
        let explanation = format!(
            "A/B test variant ({percent}%): {}",
            decision.explanation()
        );
        decision.redirected(variant.test_service.clone(), explanation)
    }
}

impl std::fmt::Debug for AbSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbSplitter")
            .field("variants", &self.variants.len())
            .finish()
    }
}
