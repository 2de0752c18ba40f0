//! Scored keyword matching with atomic index rebuilds.

use crate::index::{KeywordIndex, KeywordSpec};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use router_core::{
    RegistryListener, RouterResult, RoutingDecision, ServiceDefinition, ServiceRegistry,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Matcher configuration.
///
/// The confidence curve is `min(cap, base + score * slope)`; the defaults
/// are opinionated but overridable.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Service returned when nothing matches.
    pub default_service: String,
    /// Confidence of the no-match decision.
    pub default_confidence: f64,
    /// Confidence curve intercept.
    pub confidence_base: f64,
    /// Confidence gained per unit of score.
    pub confidence_slope: f64,
    /// Upper bound of the confidence curve.
    pub confidence_cap: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            default_service: "default-service".to_string(),
            default_confidence: 0.5,
            confidence_base: 0.5,
            confidence_slope: 0.45,
            confidence_cap: 0.95,
        }
    }
}

/// Word-boundary keyword matcher.
///
/// The compiled index lives behind an [`ArcSwap`], so a rebuild replaces it
/// in one atomic store: concurrent lookups observe either the complete old
/// index or the complete new one, never a partial blend.
pub struct KeywordMatcher {
    config: MatcherConfig,
    index: ArcSwap<KeywordIndex>,
    static_specs: Vec<KeywordSpec>,
    registry: RwLock<Option<Arc<ServiceRegistry>>>,
}

impl KeywordMatcher {
    /// Create a matcher over static keyword specs.
    ///
    /// # Errors
    /// Returns `Configuration` if the default service is blank or a spec
    /// carries a blank keyword or service.
    pub fn new(config: MatcherConfig, static_specs: Vec<KeywordSpec>) -> RouterResult<Self> {
        if config.default_service.trim().is_empty() {
            return Err(router_core::RouterError::configuration(
                "matcher default service must not be blank",
            ));
        }
        let index = KeywordIndex::build(&static_specs, None)?;
        Ok(Self {
            config,
            index: ArcSwap::from_pointee(index),
            static_specs,
            registry: RwLock::new(None),
        })
    }

    /// Create a matcher with defaults and no static keywords.
    #[must_use]
    pub fn with_defaults() -> Self {
        // An empty spec list cannot carry a blank keyword.
        #[allow(clippy::unwrap_used)]
        let matcher = Self::new(MatcherConfig::default(), Vec::new()).unwrap();
        matcher
    }

    /// The matcher configuration.
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Number of keywords currently in the index.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.index.load().len()
    }

    /// Bind the matcher to a registry and subscribe to its mutations.
    ///
    /// The index is rebuilt immediately from the static specs overlaid with
    /// the registry's keywords; subsequent register/deregister events
    /// trigger the same rebuild.
    ///
    /// # Errors
    /// Returns `Configuration` if a registry definition carries a blank
    /// keyword.
    pub fn bind_registry(self: Arc<Self>, registry: Arc<ServiceRegistry>) -> RouterResult<()> {
        *self.registry.write() = Some(registry.clone());
        self.rebuild()?;
        registry.subscribe(self);
        Ok(())
    }

    /// Rebuild the index from static specs plus the bound registry, then
    /// swap it in atomically.
    ///
    /// # Errors
    /// Returns `Configuration` for blank keywords.
    pub fn rebuild(&self) -> RouterResult<()> {
        let registry = self.registry.read().clone();
        let index = KeywordIndex::build(&self.static_specs, registry.as_deref())?;
        debug!(keywords = index.len(), "keyword index rebuilt");
        self.index.store(Arc::new(index));
        Ok(())
    }

    /// Find the best keyword match for a text.
    ///
    /// Scores every keyword as `occurrences * weight` over the lowercased
    /// text; the single highest score wins, with insertion order breaking
    /// ties. When nothing scores above zero the configured default decision
    /// is returned.
    #[must_use]
    pub fn find_best_match(&self, text: &str) -> RoutingDecision {
        let text_lower = text.to_lowercase();
        let index = self.index.load();

        let mut best: Option<(&str, &str, f64)> = None;
        for entry in index.entries() {
            let count = entry.count_matches(&text_lower);
            if count == 0 {
                continue;
            }
            let score = count as f64 * entry.weight();
            trace!(keyword = entry.keyword(), score, "keyword scored");
            if best.map_or(true, |(_, _, best_score)| score > best_score) {
                best = Some((entry.keyword(), entry.service(), score));
            }
        }

        let decision = match best {
            Some((keyword, service, score)) => {
                let confidence = (self.config.confidence_base
                    + score * self.config.confidence_slope)
                    .min(self.config.confidence_cap);
                RoutingDecision::new(
                    service,
                    confidence,
                    format!("Matched keyword '{keyword}' with score {score:.2}"),
                )
            }
            None => RoutingDecision::new(
                &self.config.default_service,
                self.config.default_confidence,
                "No keywords matched",
            ),
        };

        // Service ids are validated non-blank when the index is built.
        #[allow(clippy::unwrap_used)]
        let decision = decision.unwrap();
        decision
    }
}

impl RegistryListener for KeywordMatcher {
    fn on_register(&self, definition: &ServiceDefinition) {
        debug!(service = %definition.id(), "registry change, rebuilding keyword index");
        if let Err(error) = self.rebuild() {
            tracing::warn!(error = %error, "keyword index rebuild failed after register");
        }
    }

    fn on_deregister(&self, id: &str) {
        debug!(service = %id, "registry change, rebuilding keyword index");
        if let Err(error) = self.rebuild() {
            tracing::warn!(error = %error, "keyword index rebuild failed after deregister");
        }
    }
}

impl std::fmt::Debug for KeywordMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordMatcher")
            .field("keywords", &self.keyword_count())
            .field("default_service", &self.config.default_service)
            .finish()
    }
}
