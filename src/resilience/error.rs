//! Errors surfaced by the resilience layer.

use thiserror::Error;

/// Outcome of a guarded call that did not produce a value.
///
/// The cause of an exhausted retry plan is logged where it happens and is not
/// carried here; callers only learn that the dependency is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResilienceError {
    /// Rejected without touching the network because the circuit is open.
    #[error("{dependency} is currently unavailable (circuit open)")]
    CircuitOpen { dependency: String },

    /// Every attempt failed.
    #[error("{dependency} is unavailable after retries were exhausted")]
    UpstreamUnavailable { dependency: String },
}

impl ResilienceError {
    pub fn dependency(&self) -> &str {
        match self {
            ResilienceError::CircuitOpen { dependency }
            | ResilienceError::UpstreamUnavailable { dependency } => dependency,
        }
    }

    /// True for the fail-fast rejection.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ResilienceError::CircuitOpen { .. })
    }
}
