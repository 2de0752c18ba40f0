//! Sliding-window circuit breaker.
//!
//! The breaker observes the outcomes of the most recent calls and opens
//! when the failure rate crosses the configured threshold. An open breaker
//! rejects calls until the open timeout elapses, then admits probes in the
//! half-open state.

use parking_lot::{Mutex, RwLock};
use router_core::{RouterError, RouterResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    /// Calls flow normally.
    Closed = 0,
    /// Calls are rejected.
    Open = 1,
    /// Probe calls test whether the downstream recovered.
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Open,
            2 => Self::HalfOpen,
            _ => Self::Closed,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of recent calls the failure rate is computed over.
    pub window_size: usize,
    /// Failure rate that opens the circuit.
    pub failure_rate_threshold: f64,
    /// Observations required before the rate is considered.
    pub min_calls: usize,
    /// How long the circuit stays open before probing.
    pub open_timeout: Duration,
    /// Successful probes required to close again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            failure_rate_threshold: 0.5,
            min_calls: 10,
            open_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// Circuit breaker guarding one downstream dependency.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    /// Current state (atomic for lock-free reads).
    state: AtomicU8,
    /// Outcomes of the most recent calls, true = failure.
    window: Mutex<VecDeque<bool>>,
    half_open_successes: AtomicU32,
    /// Timestamp when the circuit opened (milliseconds since epoch).
    opened_at: AtomicU64,
    /// Lock for state transitions.
    transition_lock: RwLock<()>,
}

impl CircuitBreaker {
    /// Create a breaker.
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: AtomicU8::new(CircuitState::Closed as u8),
            window: Mutex::new(VecDeque::new()),
            half_open_successes: AtomicU32::new(0),
            opened_at: AtomicU64::new(0),
            transition_lock: RwLock::new(()),
        }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// The breaker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Whether a call may proceed.
    ///
    /// # Errors
    /// Returns `CircuitOpen` while the circuit is open and the timeout has
    /// not elapsed.
    pub fn check(&self) -> RouterResult<()> {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                if self.should_probe() {
                    self.transition_to_half_open();
                    Ok(())
                } else {
                    Err(RouterError::circuit_open(&self.name))
                }
            }
        }
    }

    /// Record the outcome of one logical call.
    pub fn record(&self, success: bool) {
        if success {
            self.record_success();
        } else {
            self.record_failure();
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        self.observe(false);
        if self.state() == CircuitState::HalfOpen {
            let successes = self.half_open_successes.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                breaker = %self.name,
                successes,
                threshold = self.config.success_threshold,
                "half-open success"
            );
            if successes >= self.config.success_threshold {
                self.transition_to_closed();
            }
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        self.observe(true);
        match self.state() {
            CircuitState::Closed => {
                let (calls, failures) = self.window_counts();
                if calls >= self.config.min_calls {
                    let rate = failures as f64 / calls as f64;
                    if rate >= self.config.failure_rate_threshold {
                        debug!(
                            breaker = %self.name,
                            rate,
                            calls,
                            "failure rate threshold reached"
                        );
                        self.transition_to_open();
                    }
                }
            }
            CircuitState::HalfOpen => {
                debug!(breaker = %self.name, "half-open failure, reopening");
                self.transition_to_open();
            }
            CircuitState::Open => {}
        }
    }

    /// Reset the breaker to closed with an empty window.
    pub fn reset(&self) {
        self.transition_to_closed();
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> CircuitBreakerStats {
        let (calls, failures) = self.window_counts();
        CircuitBreakerStats {
            state: self.state(),
            window_calls: calls,
            window_failures: failures,
        }
    }

    fn observe(&self, failed: bool) {
        let mut window = self.window.lock();
        window.push_back(failed);
        while window.len() > self.config.window_size {
            window.pop_front();
        }
    }

    fn window_counts(&self) -> (usize, usize) {
        let window = self.window.lock();
        let failures = window.iter().filter(|&&failed| failed).count();
        (window.len(), failures)
    }

    fn should_probe(&self) -> bool {
        let opened_at = self.opened_at.load(Ordering::Acquire);
        if opened_at == 0 {
            return false;
        }
        let now = now_millis();
        now.saturating_sub(opened_at) >= self.config.open_timeout.as_millis() as u64
    }

    fn transition_to_open(&self) {
        let _guard = self.transition_lock.write();
        let prev = self.state.swap(CircuitState::Open as u8, Ordering::Release);
        if prev != CircuitState::Open as u8 {
            self.opened_at.store(now_millis(), Ordering::Release);
            self.half_open_successes.store(0, Ordering::Relaxed);
            warn!(breaker = %self.name, "circuit breaker opened");
        }
    }

    fn transition_to_half_open(&self) {
        let _guard = self.transition_lock.write();
        let prev = self
            .state
            .swap(CircuitState::HalfOpen as u8, Ordering::Release);
        if prev == CircuitState::Open as u8 {
            self.half_open_successes.store(0, Ordering::Relaxed);
            info!(breaker = %self.name, "circuit breaker half-open, probing");
        }
    }

    fn transition_to_closed(&self) {
        let _guard = self.transition_lock.write();
        self.state
            .store(CircuitState::Closed as u8, Ordering::Release);
        self.half_open_successes.store(0, Ordering::Relaxed);
        self.opened_at.store(0, Ordering::Release);
        self.window.lock().clear();
        info!(breaker = %self.name, "circuit breaker closed");
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

/// Circuit breaker statistics snapshot.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerStats {
    /// Current state.
    pub state: CircuitState,
    /// Calls currently in the window.
    pub window_calls: usize,
    /// Failures currently in the window.
    pub window_failures: usize,
}

impl CircuitBreakerStats {
    /// Failure rate over the window; zero when empty.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.window_calls == 0 {
            0.0
        } else {
            self.window_failures as f64 / self.window_calls as f64
        }
    }
}
