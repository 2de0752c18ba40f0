//! Dijkstra shortest-path routing over the service graph.

use crate::graph::ServiceGraph;
use router_core::{DecisionContext, RouterError, RouterResult, RoutingDecision, RoutingPath};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use tracing::{debug, trace};

/// Fraction of the final path weight reported as estimated latency.
const LATENCY_OF_WEIGHT: f64 = 0.3;
/// Fraction of the final path weight reported as total cost.
const COST_OF_WEIGHT: f64 = 0.5;

/// Prefix that names an explicit routing target in a payload.
pub const TARGET_PREFIX: &str = "target:";

// Payload keyword -> target service, checked in order; first hit wins.
const TARGET_KEYWORDS: &[(&str, &str)] = &[
    ("auth", "auth-service"),
    ("login", "auth-service"),
    ("user", "user-service"),
    ("profile", "user-service"),
    ("billing", "billing-service"),
    ("payment", "billing-service"),
    ("notif", "notification-service"),
    ("email", "notification-service"),
];

/// Confidence curve keyed by path hop count.
#[derive(Debug, Clone)]
pub struct HopConfidence {
    /// Confidence for hop counts 0..exact.len(), in order.
    pub exact: Vec<f64>,
    /// Confidence lost per hop beyond the exact table.
    pub decay: f64,
    /// Base of the decay line.
    pub decay_base: f64,
    /// Lower bound of the curve.
    pub floor: f64,
}

impl Default for HopConfidence {
    fn default() -> Self {
        Self {
            exact: vec![1.0, 0.95, 0.90, 0.85],
            decay: 0.05,
            decay_base: 0.95,
            floor: 0.7,
        }
    }
}

impl HopConfidence {
    /// Confidence for a path with the given hop count.
    #[must_use]
    pub fn for_hops(&self, hops: usize) -> f64 {
        self.exact.get(hops).copied().unwrap_or_else(|| {
            (self.decay_base - self.decay * hops as f64).max(self.floor)
        })
    }
}

/// Pathfinder configuration.
#[derive(Debug, Clone)]
pub struct PathfinderConfig {
    /// Fixed source node of every search.
    pub source: String,
    /// Hop-count confidence curve.
    pub confidence: HopConfidence,
}

impl PathfinderConfig {
    /// Create a configuration with the default confidence curve.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            confidence: HopConfidence::default(),
        }
    }
}

// Min-heap entry ordered by tentative distance. `total_cmp` gives a total
// order over the f64 distances the search produces.
struct HeapEntry {
    distance: f64,
    node: String,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance.total_cmp(&other.distance) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we pop the smallest distance.
        other.distance.total_cmp(&self.distance)
    }
}

/// Dijkstra-based shortest-path routing from a fixed source.
#[derive(Debug)]
pub struct DijkstraPathfinder {
    graph: Arc<ServiceGraph>,
    config: PathfinderConfig,
}

impl DijkstraPathfinder {
    /// Create a pathfinder over a shared graph.
    #[must_use]
    pub fn new(graph: Arc<ServiceGraph>, config: PathfinderConfig) -> Self {
        Self { graph, config }
    }

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &Arc<ServiceGraph> {
        &self.graph
    }

    /// The configured source node.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.config.source
    }

    /// Extract the routing target from a payload.
    ///
    /// A `TARGET:` prefix names the target explicitly (remainder trimmed);
    /// otherwise the built-in keyword table is consulted against the
    /// lowercased payload.
    ///
    /// # Errors
    /// Returns `NoTarget` when neither yields a target.
    pub fn extract_target(payload: &str) -> RouterResult<String> {
        let lower = payload.to_lowercase();
        if lower.starts_with(TARGET_PREFIX) {
            let target = payload[TARGET_PREFIX.len()..].trim();
            if target.is_empty() {
                return Err(RouterError::NoTarget);
            }
            return Ok(target.to_string());
        }
        for (keyword, service) in TARGET_KEYWORDS {
            if lower.contains(keyword) {
                return Ok((*service).to_string());
            }
        }
        Err(RouterError::NoTarget)
    }

    /// Compute the least-weight path between two nodes.
    ///
    /// # Errors
    /// Returns `UnknownTarget` if the target is not a graph node and
    /// `NoPath` if it is unreachable from the source.
    pub fn shortest_path(&self, source: &str, target: &str) -> RouterResult<RoutingPath> {
        if !self.graph.contains(target) {
            return Err(RouterError::unknown_target(target));
        }

        let mut distances: HashMap<String, f64> = HashMap::new();
        let mut predecessors: HashMap<String, String> = HashMap::new();
        let mut heap = BinaryHeap::new();

        distances.insert(source.to_string(), 0.0);
        heap.push(HeapEntry {
            distance: 0.0,
            node: source.to_string(),
        });

        let mut final_weight = None;
        while let Some(HeapEntry { distance, node }) = heap.pop() {
            // A stale duplicate; a shorter route was already settled.
            if distances
                .get(&node)
                .is_some_and(|&best| distance > best)
            {
                continue;
            }
            if node == target {
                final_weight = Some(distance);
                break;
            }
            for edge in self.graph.edges_from(&node) {
                let next = distance + edge.weight();
                let better = distances
                    .get(edge.to())
                    .map_or(true, |&known| next < known);
                if better {
                    distances.insert(edge.to().to_string(), next);
                    predecessors.insert(edge.to().to_string(), node.clone());
                    heap.push(HeapEntry {
                        distance: next,
                        node: edge.to().to_string(),
                    });
                }
            }
        }

        let Some(weight) = final_weight else {
            return Err(RouterError::no_path(source, target));
        };

        // Walk target -> source through the predecessor map and reverse.
        let mut services = vec![target.to_string()];
        let mut cursor = target;
        while cursor != source {
            let Some(prev) = predecessors.get(cursor) else {
                return Err(RouterError::internal(format!(
                    "predecessor chain broken at '{cursor}'"
                )));
            };
            services.push(prev.clone());
            cursor = prev;
        }
        services.reverse();

        trace!(source, target, weight, hops = services.len() - 1, "path found");
        RoutingPath::new(
            &services,
            COST_OF_WEIGHT * weight,
            LATENCY_OF_WEIGHT * weight,
        )
    }

    /// Produce a routing decision for a request: extract the target, run
    /// the search from the configured source, and derive confidence from
    /// the hop count.
    ///
    /// # Errors
    /// Propagates `NoTarget`, `UnknownTarget`, and `NoPath`.
    pub fn decide(&self, context: &DecisionContext) -> RouterResult<RoutingDecision> {
        let target = Self::extract_target(context.payload())?;
        let path = self.shortest_path(&self.config.source, &target)?;
        let confidence = self.config.confidence.for_hops(path.hop_count());

        debug!(
            target = %target,
            hops = path.hop_count(),
            confidence,
            "pathfinder decision"
        );

        RoutingDecision::new(
            path.target(),
            confidence,
            format!(
                "Optimal path: {} (hops: {}, latency: {:.1}ms, cost: {:.4})",
                path.services().join(" \u{2192} "),
                path.hop_count(),
                path.estimated_latency(),
                path.total_cost(),
            ),
        )
    }
}
