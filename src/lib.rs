//! # Service Router
//!
//! An intelligent request router: free-form request text goes in, a
//! `(service, confidence, explanation)` decision comes out.
//!
//! Two engines cooperate behind one facade. A classifier (keyword scoring
//! or an external language model) serves simple requests; a Dijkstra
//! pathfinder over a weighted service graph serves multi-hop,
//! cost-sensitive, and failover requests, with an LRU+TTL cache in front.
//! A hybrid dispatcher selects the engine per request and layers
//! confidence-threshold fallback and A/B splitting on top.
//!
//! ```
//! use service_router::{Router, RouterConfig, ServiceConfig};
//!
//! # fn main() -> Result<(), service_router::RouterError> {
//! let mut config = RouterConfig::default();
//! config.services.push(ServiceConfig {
//!     id: "auth-service".to_string(),
//!     display_name: "Auth".to_string(),
//!     keywords: vec!["login".to_string(), "token".to_string()],
//! });
//!
//! let router = Router::from_config(config)?;
//! let result = router.route("please login")?;
//! assert_eq!(result.service(), "auth-service");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
pub mod telemetry;

use builder::WiredRouter;
use once_cell::sync::OnceCell;
use std::sync::Arc;

// Re-export the library surface.
pub use router_classify::{
    BuiltinClassifier, Classifier, ComplexityAnalyzer, KeywordMatcher, KeywordSpec, MatcherConfig,
    RequestComplexity,
};
pub use router_config::{
    AbTestConfig, CacheConfig, ClassifierKind, EdgeConfig, ExternalConfig, GraphConfig,
    RouterConfig, ServiceConfig, TierConfig,
};
pub use router_config::load_from_path;
pub use router_core::{
    DecisionContext, InputValidator, RegistryListener, RouterError, RouterResult, RoutingDecision,
    RoutingPath, RoutingResult, ServiceDefinition, ServiceRegistry,
};
pub use router_dispatch::{
    AbSplitter, AbVariant, ClassifierChain, HybridDispatcher, RandomSource, ThresholdFallback,
    TieredClassifier,
};
pub use router_graph::{
    CacheStats, DijkstraPathfinder, EdgeMetrics, PathCache, ServiceGraph,
};
pub use router_providers::{ExternalClassifier, ExternalClassifierConfig};
pub use telemetry::{init_tracing, TracingConfig};

/// The router facade.
///
/// Owns the full component stack wired from a [`RouterConfig`]: registry,
/// keyword matcher, classifiers, graph, cache, and dispatcher.
pub struct Router {
    dispatcher: Arc<router_dispatch::HybridDispatcher>,
    registry: Arc<ServiceRegistry>,
    matcher: Arc<KeywordMatcher>,
    cache: Option<Arc<PathCache>>,
    blocking_runtime: OnceCell<tokio::runtime::Runtime>,
}

impl Router {
    /// Build a router from a configuration.
    ///
    /// # Errors
    /// Returns `Configuration` when the settings are invalid.
    pub fn from_config(config: RouterConfig) -> RouterResult<Self> {
        Self::from_config_with_random(config, None)
    }

    /// Build a router with an explicit random source for the A/B split,
    /// for deterministic tests.
    ///
    /// # Errors
    /// Returns `Configuration` when the settings are invalid.
    pub fn from_config_with_random(
        config: RouterConfig,
        random: Option<Box<dyn RandomSource>>,
    ) -> RouterResult<Self> {
        let WiredRouter {
            dispatcher,
            registry,
            matcher,
            cache,
        } = builder::wire(&config, random)?;
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            registry,
            matcher,
            cache,
            blocking_runtime: OnceCell::new(),
        })
    }

    /// Route a request asynchronously.
    ///
    /// # Errors
    /// Propagates validation, classification, and pathfinding failures.
    pub async fn route_async(&self, text: &str) -> RouterResult<RoutingResult> {
        self.dispatcher.dispatch(text).await
    }

    /// Route a request, blocking the calling thread.
    ///
    /// Runs on a dedicated current-thread runtime owned by this router;
    /// must not be called from inside an async context.
    ///
    /// # Errors
    /// Propagates validation, classification, and pathfinding failures.
    pub fn route(&self, text: &str) -> RouterResult<RoutingResult> {
        self.blocking_runtime()?.block_on(self.route_async(text))
    }

    /// Route a batch of requests concurrently; the result order matches
    /// the input order even when inner calls finish out of order.
    pub async fn route_batch_async(
        &self,
        texts: &[&str],
    ) -> Vec<RouterResult<RoutingResult>> {
        futures::future::join_all(texts.iter().map(|text| self.route_async(text))).await
    }

    /// Blocking variant of [`Router::route_batch_async`].
    ///
    /// # Errors
    /// Returns `Internal` when the blocking runtime cannot be created.
    pub fn route_batch(&self, texts: &[&str]) -> RouterResult<Vec<RouterResult<RoutingResult>>> {
        Ok(self
            .blocking_runtime()?
            .block_on(self.route_batch_async(texts)))
    }

    /// The service registry; mutations rebuild the keyword index.
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// The keyword matcher.
    #[must_use]
    pub fn matcher(&self) -> &Arc<KeywordMatcher> {
        &self.matcher
    }

    /// Snapshot of the path cache counters, when a cache is configured.
    #[must_use]
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// The dispatcher, for callers composing their own facade.
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<router_dispatch::HybridDispatcher> {
        &self.dispatcher
    }

    fn blocking_runtime(&self) -> RouterResult<&tokio::runtime::Runtime> {
        self.blocking_runtime.get_or_try_init(|| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    RouterError::internal(format!("failed to build blocking runtime: {e}"))
                })
        })
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("services", &self.registry.len())
            .field("keywords", &self.matcher.keyword_count())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
