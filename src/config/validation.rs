//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (thresholds > 0, timeouts > 0, delays ordered)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("upstream.name must not be empty")]
    EmptyUpstreamName,

    #[error("upstream.base_url '{url}' is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("retries.max_delay_ms ({max}) is below retries.initial_delay_ms ({initial})")]
    MaxDelayBelowInitial { initial: u64, max: u64 },

    #[error("retries.jitter_percent ({0}) must be at most 100")]
    JitterOutOfRange(u8),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.name.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstreamName);
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::InvalidUpstreamUrl {
                url: config.upstream.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::MustBePositive("upstream.request_timeout_secs"));
    }
    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::MustBePositive("circuit_breaker.failure_threshold"));
    }
    if config.circuit_breaker.half_open_test_count == 0 {
        errors.push(ValidationError::MustBePositive("circuit_breaker.half_open_test_count"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::MustBePositive("timeouts.request_secs"));
    }

    let retries = &config.retries;
    if retries.max_delay_ms < retries.initial_delay_ms {
        errors.push(ValidationError::MaxDelayBelowInitial {
            initial: retries.initial_delay_ms,
            max: retries.max_delay_ms,
        });
    }
    if retries.jitter_percent > 100 {
        errors.push(ValidationError::JitterOutOfRange(retries.jitter_percent));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.base_url = "ftp://products".into();
        config.circuit_breaker.failure_threshold = 0;
        config.retries.initial_delay_ms = 5_000;
        config.retries.max_delay_ms = 1_000;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not-an-address".into())));
        assert!(errors.contains(&ValidationError::MustBePositive(
            "circuit_breaker.failure_threshold"
        )));
        assert!(errors.contains(&ValidationError::MaxDelayBelowInitial {
            initial: 5_000,
            max: 1_000
        }));
        assert!(matches!(
            errors.iter().find(|e| matches!(e, ValidationError::InvalidUpstreamUrl { .. })),
            Some(ValidationError::InvalidUpstreamUrl { reason, .. }) if reason.contains("ftp")
        ));
    }

    #[test]
    fn test_rejects_unparseable_url_and_zero_probe_budget() {
        let mut config = ServiceConfig::default();
        config.upstream.base_url = "localhost:3001/products".into();
        config.upstream.name = "  ".into();
        config.circuit_breaker.half_open_test_count = 0;
        config.retries.jitter_percent = 150;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyUpstreamName));
        assert!(errors.contains(&ValidationError::JitterOutOfRange(150)));
        assert!(errors.contains(&ValidationError::MustBePositive(
            "circuit_breaker.half_open_test_count"
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUpstreamUrl { .. })));
    }
}
