//! Retry logic.
//!
//! # Responsibilities
//! - Run a call, retrying failures with exponential backoff
//! - Report every outcome to the circuit breaker and the metrics recorder
//!
//! # Design Decisions
//! - `max_attempts` counts retries after the first try (3 means up to 4 tries)
//! - Explicit loop with a bounded counter; waits use `tokio::time::sleep`
//! - Never consults the circuit state; admission happens before the loop starts
//! - Every failure counts as a retry attempt, including the one that exhausts the plan

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::observability::metrics::MetricsRecorder;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::circuit_breaker::CircuitBreaker;

/// Retry parameters, converted from [`RetryConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter_percent: u8,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter_percent: config.jitter_percent,
        }
    }
}

/// Per-invocation retry bookkeeping.
#[derive(Debug, Clone)]
pub struct RetryPlan {
    policy: RetryPolicy,
    attempts_remaining: u32,
    retries_taken: u32,
}

impl RetryPlan {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts_remaining: policy.max_attempts,
            retries_taken: 0,
        }
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Delay the next retry would wait, without consuming it.
    pub fn current_delay(&self) -> Duration {
        self.delay_for(self.retries_taken + 1)
    }

    /// Consume one retry and return how long to wait before it, or `None` once exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts_remaining == 0 {
            return None;
        }
        self.attempts_remaining -= 1;
        self.retries_taken += 1;
        Some(self.delay_for(self.retries_taken))
    }

    fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(
            retry,
            self.policy.initial_delay.as_millis() as u64,
            self.policy.max_delay.as_millis() as u64,
            self.policy.jitter_percent,
        )
    }
}

/// Runs calls under a [`RetryPolicy`], feeding outcomes to a breaker.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
    metrics: MetricsRecorder,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, breaker: Arc<CircuitBreaker>, metrics: MetricsRecorder) -> Self {
        Self {
            policy,
            breaker,
            metrics,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `call` until it succeeds or the plan is exhausted.
    ///
    /// Returns the last error once no retries remain.
    pub async fn execute<T, E, F, Fut>(&self, mut call: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut plan = RetryPlan::new(self.policy);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let error = match call().await {
                Ok(value) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Err(e) => e,
            };

            self.metrics.record_retry_attempt();
            self.breaker.record_failure();

            let retries_left = plan.attempts_remaining();
            let Some(delay) = plan.next_delay() else {
                tracing::error!(
                    dependency = %self.metrics.dependency(),
                    component = "retry",
                    attempt,
                    error = %error,
                    "Max retries reached. Failed to execute function."
                );
                return Err(error);
            };

            tracing::warn!(
                dependency = %self.metrics.dependency(),
                component = "retry",
                attempt,
                retries_left,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            );
            drop(error);
            tokio::time::sleep(delay).await;
        }
    }
}
