//! Metrics collection and exposition.
//!
//! # Metrics
//! - `product_service_requests_total` (counter): guarded calls to the dependency
//! - `retry_attempts_total` (counter): failed attempts observed by the retry loop
//! - `circuit_breaker_opens_total` (counter): Closed → Open transitions
//! - `circuit_breaker_short_circuited_total` (counter): calls rejected by an open circuit
//! - `circuit_breaker_state` (gauge): 0=closed, 1=open, 2=half_open
//! - `http_request_total` (counter): inbound requests by method, path, status
//!
//! Dependency-scoped metrics carry a `service` label naming the dependency.
//! Updates go through the `metrics` facade; the Prometheus recorder renders
//! them for the `/metrics` endpoint.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::resilience::circuit_breaker::CircuitState;

pub const REQUESTS_TOTAL: &str = "product_service_requests_total";
pub const RETRY_ATTEMPTS_TOTAL: &str = "retry_attempts_total";
pub const CIRCUIT_OPENS_TOTAL: &str = "circuit_breaker_opens_total";
pub const SHORT_CIRCUITED_TOTAL: &str = "circuit_breaker_short_circuited_total";
pub const CIRCUIT_STATE: &str = "circuit_breaker_state";
pub const HTTP_REQUEST_TOTAL: &str = "http_request_total";

/// Install the global Prometheus recorder and return the handle used to render it.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Register help text for every metric this service emits.
pub fn describe_metrics() {
    describe_counter!(
        REQUESTS_TOTAL,
        "Total number of requests made by User Service to Product Service"
    );
    describe_counter!(
        RETRY_ATTEMPTS_TOTAL,
        "Total number of retry attempts made for Product Service requests"
    );
    describe_counter!(
        CIRCUIT_OPENS_TOTAL,
        "Total number of times the circuit breaker has transitioned to open state"
    );
    describe_counter!(
        SHORT_CIRCUITED_TOTAL,
        "Total number of requests short-circuited by the circuit breaker (failed fast)"
    );
    describe_gauge!(
        CIRCUIT_STATE,
        "Current state of the circuit breaker (0=closed, 1=open, 2=half_open)"
    );
    describe_counter!(
        HTTP_REQUEST_TOTAL,
        "Total number of HTTP requests processed by the service"
    );
}

/// Record a completed inbound HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16) {
    counter!(
        HTTP_REQUEST_TOTAL,
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Metric hooks for one guarded dependency.
///
/// Only accumulates; nothing here reads values back or resets them.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    dependency: String,
}

impl MetricsRecorder {
    pub fn new(dependency: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
        }
    }

    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    pub fn record_request(&self) {
        counter!(REQUESTS_TOTAL, "service" => self.dependency.clone()).increment(1);
    }

    pub fn record_retry_attempt(&self) {
        counter!(RETRY_ATTEMPTS_TOTAL, "service" => self.dependency.clone()).increment(1);
    }

    pub fn record_circuit_open(&self) {
        counter!(CIRCUIT_OPENS_TOTAL, "service" => self.dependency.clone()).increment(1);
    }

    pub fn record_short_circuit(&self) {
        counter!(SHORT_CIRCUITED_TOTAL, "service" => self.dependency.clone()).increment(1);
    }

    pub fn set_circuit_state(&self, state: CircuitState) {
        gauge!(CIRCUIT_STATE, "service" => self.dependency.clone()).set(f64::from(state.ordinal()));
    }
}
