//! Resilient invocation of a remote call.
//!
//! Composes the circuit breaker, the retry executor and the metrics hooks for
//! one dependency. This is the entry point the rest of the service calls.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use crate::config::{CircuitBreakerConfig, RetryConfig};
use crate::observability::metrics::MetricsRecorder;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::error::ResilienceError;
use crate::resilience::retries::{RetryExecutor, RetryPolicy};

/// Guard around one dependency.
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    breaker: Arc<CircuitBreaker>,
    retry: RetryExecutor,
    metrics: MetricsRecorder,
}

impl ResilientInvoker {
    /// Build the breaker/retry pair for `dependency`, which also labels its metrics.
    pub fn new(
        dependency: impl Into<String>,
        breaker_config: &CircuitBreakerConfig,
        retry_config: &RetryConfig,
    ) -> Self {
        let metrics = MetricsRecorder::new(dependency);
        let breaker = Arc::new(CircuitBreaker::new(breaker_config, metrics.clone()));
        let retry = RetryExecutor::new(
            RetryPolicy::from(retry_config),
            breaker.clone(),
            metrics.clone(),
        );
        Self {
            breaker,
            retry,
            metrics,
        }
    }

    pub fn dependency(&self) -> &str {
        self.metrics.dependency()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Perform `call` resiliently.
    ///
    /// Fails fast with [`ResilienceError::CircuitOpen`] when the breaker rejects
    /// the request; otherwise retries per policy and maps exhaustion to
    /// [`ResilienceError::UpstreamUnavailable`].
    pub async fn call<T, E, F, Fut>(&self, call: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.metrics.record_request();

        if !self.breaker.allow_request() {
            return Err(ResilienceError::CircuitOpen {
                dependency: self.dependency().to_string(),
            });
        }

        match self.retry.execute(call).await {
            Ok(value) => {
                tracing::info!(
                    dependency = %self.dependency(),
                    component = "http-call",
                    "Successfully fetched from dependency."
                );
                Ok(value)
            }
            Err(e) => {
                tracing::error!(
                    dependency = %self.dependency(),
                    component = "app-service",
                    error = %e,
                    "Failed to fetch from dependency after multiple retries."
                );
                Err(ResilienceError::UpstreamUnavailable {
                    dependency: self.dependency().to_string(),
                })
            }
        }
    }

    /// Perform `call` on a spawned task and wait for its outcome.
    ///
    /// Dropping the returned future does not stop the attempts or the backoff
    /// waits; the breaker and metrics still see every outcome.
    pub async fn call_detached<T, E, F, Fut>(&self, call: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let invoker = self.clone();
        let task = tokio::spawn(async move { invoker.call(call).await });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    dependency = %self.dependency(),
                    component = "app-service",
                    error = %e,
                    "Guarded call task did not complete"
                );
                Err(ResilienceError::UpstreamUnavailable {
                    dependency: self.dependency().to_string(),
                })
            }
        }
    }
}
