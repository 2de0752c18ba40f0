//! Tracing setup for embedding applications.
//!
//! The router logs through `tracing` everywhere; hosts that do not install
//! their own subscriber can use this minimal bootstrap.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name reported in log lines.
    pub service_name: String,
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "service-router".to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl TracingConfig {
    /// Create a configuration for a service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the default log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Emit JSON lines.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
/// Returns an error when a subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TracingError::Init(e.to_string()))?;

    info!(service = %config.service_name, "tracing initialized");
    Ok(())
}

/// Tracing initialization error.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Failed to install the subscriber.
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}
