//! The directed weighted service graph.

use crate::metrics::EdgeMetrics;
use dashmap::DashMap;
use router_core::RouterResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A directed edge between two services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEdge {
    from: String,
    to: String,
    metrics: EdgeMetrics,
}

impl ServiceEdge {
    /// Create an edge.
    pub fn new(from: impl Into<String>, to: impl Into<String>, metrics: EdgeMetrics) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            metrics,
        }
    }

    /// Source node id.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Destination node id.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Edge metrics.
    #[must_use]
    pub fn metrics(&self) -> &EdgeMetrics {
        &self.metrics
    }

    /// Derived edge weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.metrics.weight()
    }
}

/// Directed weighted multigraph of services.
///
/// Nodes and per-node out-edge lists live in sharded maps; mutations take
/// the owning shard's lock, so each operation is linearizable with respect
/// to reads of the same node and reads never observe a half-applied
/// update.
#[derive(Debug, Default)]
pub struct ServiceGraph {
    nodes: DashMap<String, HashMap<String, String>>,
    out_edges: DashMap<String, Vec<ServiceEdge>>,
}

impl ServiceGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service node. Idempotent on the id; the latest metadata wins.
    pub fn add_service(&self, id: impl Into<String>, metadata: HashMap<String, String>) {
        let id = id.into();
        debug!(service = %id, "graph node added");
        self.nodes.insert(id.clone(), metadata);
        self.out_edges.entry(id).or_default();
    }

    /// Add a directed edge. Both endpoints are created with empty metadata
    /// when absent; duplicate edges are kept and all of them are
    /// considered by the pathfinder.
    pub fn add_edge(&self, from: impl Into<String>, to: impl Into<String>, metrics: EdgeMetrics) {
        let from = from.into();
        let to = to.into();
        self.nodes.entry(from.clone()).or_default();
        self.nodes.entry(to.clone()).or_default();
        self.out_edges.entry(to.clone()).or_default();
        let edge = ServiceEdge::new(from.clone(), to, metrics);
        self.out_edges.entry(from).or_default().push(edge);
    }

    /// Replace the reliability on every outgoing edge of a service,
    /// preserving latency and cost. Unknown ids are a no-op.
    ///
    /// # Errors
    /// Returns `Configuration` if the reliability is outside `[0, 1]`.
    pub fn update_service_reliability(&self, id: &str, reliability: f64) -> RouterResult<()> {
        if let Some(mut edges) = self.out_edges.get_mut(id) {
            for edge in edges.iter_mut() {
                edge.metrics = edge.metrics.with_reliability(reliability)?;
            }
            debug!(service = %id, reliability, edges = edges.len(), "reliability updated");
        }
        Ok(())
    }

    /// Whether a node exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Metadata of a node, when present.
    #[must_use]
    pub fn metadata(&self, id: &str) -> Option<HashMap<String, String>> {
        self.nodes.get(id).map(|entry| entry.clone())
    }

    /// Outgoing edges of a node. Unknown ids yield an empty list.
    #[must_use]
    pub fn edges_from(&self, id: &str) -> Vec<ServiceEdge> {
        self.out_edges
            .get(id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// All node ids. Snapshot; concurrent mutations may not be reflected.
    #[must_use]
    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_edges.iter().map(|entry| entry.len()).sum()
    }
}
