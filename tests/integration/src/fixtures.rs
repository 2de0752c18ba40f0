//! Test fixtures and sample configurations.

use service_router::{
    CacheConfig, EdgeConfig, GraphConfig, RouterConfig, ServiceConfig,
};

/// The two-service registry used by the keyword scenarios.
pub fn keyword_services() -> Vec<ServiceConfig> {
    vec![
        ServiceConfig {
            id: "auth-service".to_string(),
            display_name: "Authentication".to_string(),
            keywords: vec!["login".to_string(), "token".to_string()],
        },
        ServiceConfig {
            id: "bi-service".to_string(),
            display_name: "Business Intelligence".to_string(),
            keywords: vec!["kpi".to_string(), "report".to_string()],
        },
    ]
}

/// Configuration with only the keyword classifier.
pub fn keyword_config() -> RouterConfig {
    RouterConfig {
        services: keyword_services(),
        ..Default::default()
    }
}

/// The four-edge sample graph: the two-hop route to `user-service` beats
/// the expensive direct edge.
pub fn sample_edges() -> Vec<EdgeConfig> {
    vec![
        EdgeConfig {
            from: "gateway".to_string(),
            to: "auth-service".to_string(),
            latency: 10.0,
            cost: 0.0,
            reliability: 0.999,
        },
        EdgeConfig {
            from: "auth-service".to_string(),
            to: "user-service".to_string(),
            latency: 20.0,
            cost: 0.001,
            reliability: 0.99,
        },
        EdgeConfig {
            from: "user-service".to_string(),
            to: "billing-service".to_string(),
            latency: 30.0,
            cost: 0.002,
            reliability: 0.98,
        },
        EdgeConfig {
            from: "gateway".to_string(),
            to: "user-service".to_string(),
            latency: 100.0,
            cost: 0.01,
            reliability: 0.95,
        },
    ]
}

/// Configuration with keyword services plus the graph subsystem.
pub fn graph_config() -> RouterConfig {
    RouterConfig {
        services: keyword_services(),
        graph: GraphConfig {
            enabled: true,
            source: "gateway".to_string(),
            edges: sample_edges(),
            cache: CacheConfig::default(),
        },
        ..Default::default()
    }
}

/// Same as [`graph_config`] but with the cache disabled.
pub fn graph_config_uncached() -> RouterConfig {
    let mut config = graph_config();
    config.graph.cache.enabled = false;
    config
}
