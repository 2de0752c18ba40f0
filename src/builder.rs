//! Config-driven wiring of the router.

use router_classify::{BuiltinClassifier, Classifier, KeywordMatcher, MatcherConfig};
use router_config::{ClassifierKind, RouterConfig};
use router_core::{RouterResult, ServiceDefinition, ServiceRegistry};
use router_dispatch::{
    AbSplitter, AbVariant, DispatcherBuilder, HybridDispatcher, RandomSource, ThresholdFallback,
    TieredClassifier,
};
use router_graph::{
    DijkstraPathfinder, EdgeMetrics, PathCache, PathCacheConfig, PathfinderConfig, ServiceGraph,
};
use router_providers::{ExternalClassifier, ExternalClassifierConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything the facade owns after wiring.
pub(crate) struct WiredRouter {
    pub dispatcher: HybridDispatcher,
    pub registry: Arc<ServiceRegistry>,
    pub matcher: Arc<KeywordMatcher>,
    pub cache: Option<Arc<PathCache>>,
}

/// Build the full component stack from a validated configuration.
pub(crate) fn wire(
    config: &RouterConfig,
    random: Option<Box<dyn RandomSource>>,
) -> RouterResult<WiredRouter> {
    config.validate()?;

    // Registry and the keyword matcher bound to it.
    let registry = Arc::new(ServiceRegistry::new());
    for service in &config.services {
        registry.register(ServiceDefinition::new(
            &service.id,
            &service.display_name,
            service.keywords.clone(),
        )?);
    }
    let matcher = Arc::new(KeywordMatcher::new(MatcherConfig::default(), Vec::new())?);
    Arc::clone(&matcher).bind_registry(registry.clone())?;

    // Classifier selection.
    let builtin: Arc<dyn Classifier> = Arc::new(BuiltinClassifier::new(matcher.clone()));
    let classifier: Arc<dyn Classifier> = match config.classifier {
        ClassifierKind::Builtin => builtin,
        ClassifierKind::External => Arc::new(build_external(config)?),
        ClassifierKind::Hybrid => {
            let external: Arc<dyn Classifier> = Arc::new(build_external(config)?);
            Arc::new(router_dispatch::ClassifierChain::new(vec![
                external, builtin,
            ])?)
        }
    };

    // Optional keyword-first tiering in front of the selected classifier.
    let classifier: Arc<dyn Classifier> = if config.tiers.enabled {
        Arc::new(
            TieredClassifier::new(matcher.clone(), classifier)
                .with_keyword_threshold(config.tiers.keyword_threshold),
        )
    } else {
        classifier
    };

    // Graph subsystem.
    let mut pathfinder = None;
    let mut cache = None;
    if config.graph.enabled {
        let graph = ServiceGraph::new();
        for edge in &config.graph.edges {
            graph.add_edge(
                &edge.from,
                &edge.to,
                EdgeMetrics::new(edge.latency, edge.cost, edge.reliability)?,
            );
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            source = %config.graph.source,
            "service graph built"
        );
        pathfinder = Some(Arc::new(DijkstraPathfinder::new(
            Arc::new(graph),
            PathfinderConfig::new(&config.graph.source),
        )));
        if config.graph.cache.enabled {
            cache = Some(Arc::new(PathCache::new(PathCacheConfig {
                max_size: config.graph.cache.max_size,
                ttl: Duration::from_millis(config.graph.cache.ttl_ms),
            })));
        }
    }

    // Dispatcher layering.
    let mut builder: DispatcherBuilder = HybridDispatcher::builder(classifier);
    if let Some(pathfinder) = pathfinder {
        builder = builder.pathfinder(pathfinder);
    }
    if let Some(cache) = &cache {
        builder = builder.cache(cache.clone());
    }
    if config.fallback_service.is_some() || config.strict {
        builder = builder.threshold(ThresholdFallback {
            min_confidence: config.confidence_threshold,
            fallback_service: config.fallback_service.clone(),
            strict: config.strict,
        });
    }
    if !config.ab_tests.is_empty() {
        let variants: HashMap<String, AbVariant> = config
            .ab_tests
            .iter()
            .map(|(original, test)| {
                (
                    original.clone(),
                    AbVariant {
                        test_service: test.test_service.clone(),
                        probability: test.probability,
                    },
                )
            })
            .collect();
        builder = builder.ab_splitter(match random {
            Some(random) => AbSplitter::with_random(variants, random),
            None => AbSplitter::new(variants),
        });
    }

    Ok(WiredRouter {
        dispatcher: builder.build(),
        registry,
        matcher,
        cache,
    })
}

fn build_external(config: &RouterConfig) -> RouterResult<ExternalClassifier> {
    ExternalClassifier::new(
        ExternalClassifierConfig::new(config.external.api_key.clone())
            .with_endpoint(config.external.endpoint.clone())
            .with_model(config.external.model.clone())
            .with_temperature(config.external.temperature)
            .with_timeout(Duration::from_millis(config.external.timeout_ms))
            .with_retries(
                config.external.max_retries,
                Duration::from_millis(config.external.backoff_ms),
            ),
    )
}
