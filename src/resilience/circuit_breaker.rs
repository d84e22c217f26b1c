//! Circuit breaker for the upstream dependency.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: dependency assumed down, requests fail fast
//! - Half-Open: testing if the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: next admission check after reset_timeout has elapsed
//! Half-Open → Closed: any recorded success
//! Half-Open → Open: admission check once failure_count >= half_open_test_count
//! Open → Closed: any recorded success (late success from an in-flight call)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, shared by every inbound request
//! - All state lives behind a single mutex; each operation is one critical section
//! - The lock is never held across an await point
//! - In Half-Open, `failure_count` counts failed probe attempts, not admitted probes

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics::MetricsRecorder;

/// State of the circuit breaker.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests pass through.
    Closed = 0,
    /// Requests are rejected without reaching the network.
    Open = 1,
    /// Limited probe requests are admitted.
    HalfOpen = 2,
}

impl CircuitState {
    /// Ordinal exported on the state gauge.
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Point-in-time view of a breaker, served by the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub dependency: String,
    pub state: CircuitState,
    pub failure_count: u32,
    /// Milliseconds since the last recorded failure, if any.
    pub since_last_failure_ms: Option<u64>,
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    pub half_open_test_count: u32,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker guarding a single dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerState>,
    failure_threshold: u32,
    reset_timeout: Duration,
    half_open_test_count: u32,
    metrics: MetricsRecorder,
}

impl CircuitBreaker {
    /// Create a closed breaker and publish its initial state.
    pub fn new(config: &CircuitBreakerConfig, metrics: MetricsRecorder) -> Self {
        metrics.set_circuit_state(CircuitState::Closed);
        Self {
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
            failure_threshold: config.failure_threshold,
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
            half_open_test_count: config.half_open_test_count,
            metrics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the protected dependency.
    pub fn dependency(&self) -> &str {
        self.metrics.dependency()
    }

    /// Decide whether a call may proceed now.
    ///
    /// May move Open → Half-Open once the reset timeout has elapsed, or
    /// Half-Open → Open once the probe budget is used up.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::Closed => {
                self.metrics.set_circuit_state(CircuitState::Closed);
                true
            }
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure
                    .map_or(Duration::MAX, |at| now.saturating_duration_since(at));

                if elapsed > self.reset_timeout {
                    tracing::info!(
                        dependency = %self.dependency(),
                        component = "circuit-breaker",
                        "Circuit Breaker: Timeout elapsed. Moving to HALF_OPEN state."
                    );
                    inner.state = CircuitState::HalfOpen;
                    inner.failure_count = 0;
                    self.metrics.set_circuit_state(CircuitState::HalfOpen);
                    true
                } else {
                    tracing::warn!(
                        dependency = %self.dependency(),
                        component = "circuit-breaker",
                        "Circuit Breaker: Circuit is OPEN. Request rejected immediately."
                    );
                    self.metrics.record_short_circuit();
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.failure_count < self.half_open_test_count {
                    tracing::info!(
                        dependency = %self.dependency(),
                        component = "circuit-breaker",
                        test_count = %format!("{}/{}", inner.failure_count + 1, self.half_open_test_count),
                        "Circuit Breaker: Circuit is HALF_OPEN. Allowing test request."
                    );
                    true
                } else {
                    tracing::warn!(
                        dependency = %self.dependency(),
                        component = "circuit-breaker",
                        "Circuit Breaker: Test requests failed in HALF_OPEN. Re-opening circuit."
                    );
                    inner.state = CircuitState::Open;
                    inner.last_failure = Some(now);
                    self.metrics.set_circuit_state(CircuitState::Open);
                    false
                }
            }
        }
    }

    /// Report a failed attempt. Trips the breaker when Closed and the threshold is reached.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);
        inner.last_failure = Some(Instant::now());

        if inner.state == CircuitState::Closed && inner.failure_count >= self.failure_threshold {
            tracing::warn!(
                dependency = %self.dependency(),
                component = "circuit-breaker",
                failures = inner.failure_count,
                threshold = self.failure_threshold,
                "Circuit Breaker: Threshold reached. Opening circuit!"
            );
            inner.state = CircuitState::Open;
            self.metrics.record_circuit_open();
            self.metrics.set_circuit_state(CircuitState::Open);
        }
    }

    /// Report a successful attempt. Closes the circuit and clears the failure count.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != CircuitState::Closed {
            tracing::info!(
                dependency = %self.dependency(),
                component = "circuit-breaker",
                previous = %inner.state,
                "Circuit Breaker: Resetting failure count and closing circuit."
            );
            inner.state = CircuitState::Closed;
            self.metrics.set_circuit_state(CircuitState::Closed);
        }
        inner.failure_count = 0;
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Instant of the most recent failure or forced re-open.
    pub fn last_failure_time(&self) -> Option<Instant> {
        self.lock().last_failure
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.lock();
        CircuitSnapshot {
            dependency: self.dependency().to_string(),
            state: inner.state,
            failure_count: inner.failure_count,
            since_last_failure_ms: inner
                .last_failure
                .map(|at| Instant::now().saturating_duration_since(at).as_millis() as u64),
            failure_threshold: self.failure_threshold,
            reset_timeout_ms: self.reset_timeout.as_millis() as u64,
            half_open_test_count: self.half_open_test_count,
        }
    }
}
