//! # Router Resilience
//!
//! Resilience policies wrapped around the external classifier:
//! - Retry with exponential backoff and jitter
//! - A sliding-window failure-rate circuit breaker
//!
//! The two compose: retry wraps a call, the breaker wraps the retry, and a
//! call counts as one breaker observation no matter how many attempts the
//! retry policy made.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use retry::{RetryConfig, RetryPolicy};
