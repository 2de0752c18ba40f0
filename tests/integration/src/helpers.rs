//! Test helper utilities.

use once_cell::sync::Lazy;
use service_router::{RandomSource, Router, RouterConfig};
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
});

/// Initialize tracing for tests (only once, opt-in via `TEST_LOG`).
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Build a router from a configuration, panicking on wiring errors.
pub fn router(config: RouterConfig) -> Router {
    init_tracing();
    Router::from_config(config).expect("failed to wire router")
}

/// Random source returning a fixed sample, for deterministic A/B tests.
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}
