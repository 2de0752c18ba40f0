//! # Router Graph
//!
//! Graph-based routing for multi-hop and cost-sensitive requests.
//!
//! This crate provides:
//! - The directed weighted service graph with linearizable mutations
//! - Dijkstra shortest-path search with hop-based confidence
//! - A bounded LRU+TTL cache over routing decisions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod graph;
pub mod metrics;
pub mod pathfinder;

// Re-export main types
pub use cache::{CacheStats, PathCache, PathCacheConfig};
pub use graph::{ServiceEdge, ServiceGraph};
pub use metrics::EdgeMetrics;
pub use pathfinder::{DijkstraPathfinder, HopConfidence, PathfinderConfig};
