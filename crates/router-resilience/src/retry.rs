//! Retry policy with exponential backoff.

use rand::Rng;
use router_core::{RouterError, RouterResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (total attempts = 1 + max_retries).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Backoff multiplier applied per attempt.
    pub multiplier: f64,
    /// Jitter factor (0.0 - 1.0) applied to each delay.
    pub jitter: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

/// Retry policy implementation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Create a policy with custom retry count and initial delay.
    #[must_use]
    pub fn with_backoff(max_retries: u32, initial_delay: Duration) -> Self {
        Self::new(RetryConfig {
            max_retries,
            initial_delay,
            ..Default::default()
        })
    }

    /// Calculate the delay before retry number `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.config.initial_delay.as_millis() as f64;
        let delay = base * self.config.multiplier.powi(attempt as i32);
        let delay = delay.min(self.config.max_delay.as_millis() as f64);

        if self.config.jitter <= 0.0 {
            return Duration::from_millis(delay as u64);
        }
        let jitter_range = delay * self.config.jitter;
        let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
        Duration::from_millis((delay + jitter).max(0.0) as u64)
    }

    /// Execute an operation, retrying retryable failures.
    ///
    /// # Errors
    /// Returns the final error once attempts are exhausted or a
    /// non-retryable error is seen.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> RouterResult<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = RouterResult<T>>,
    {
        for attempt in 0..=self.config.max_retries {
            match operation(attempt).await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(attempt, "retry succeeded");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if !error.is_retryable() || attempt == self.config.max_retries {
                        return Err(error);
                    }
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying after error"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        Err(RouterError::internal("retry loop exhausted without error"))
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}
