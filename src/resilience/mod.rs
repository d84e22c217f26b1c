//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Guarded call:
//!     → invoker.rs (count request, ask breaker for admission)
//!     → circuit_breaker.rs (admit, or fail fast with CircuitOpen)
//!     → retries.rs (attempt, back off via backoff.rs, report each outcome)
//!     → invoker.rs (value, or UpstreamUnavailable)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, shared across concurrent requests
//! - Fail-fast rejections are never retried and never reach the network
//! - The invoker is the only place internal failures become caller-facing errors

pub mod backoff;
pub mod circuit_breaker;
pub mod error;
pub mod invoker;
pub mod retries;

pub use circuit_breaker::{CircuitBreaker, CircuitSnapshot, CircuitState};
pub use error::ResilienceError;
pub use invoker::ResilientInvoker;
pub use retries::{RetryExecutor, RetryPlan, RetryPolicy};
