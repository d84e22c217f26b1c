//! HTTP middleware.

pub mod metrics;

pub use self::metrics::request_metrics_middleware;
