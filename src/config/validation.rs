//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and returns every
//! problem found rather than stopping at the first one.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ReprobePolicy, ServiceConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("store.host must not be empty")]
    EmptyHost,

    #[error("store.port must be non-zero")]
    ZeroPort,

    #[error("store.counter_key must not be empty")]
    EmptyCounterKey,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Validate a fully layered configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let store = &config.store;
    if store.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if store.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if store.counter_key.is_empty() {
        errors.push(ValidationError::EmptyCounterKey);
    }
    if store.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("store.connect_timeout_ms"));
    }
    if store.response_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("store.response_timeout_ms"));
    }
    match store.reprobe {
        ReprobePolicy::Interval { interval_secs: 0 } => {
            errors.push(ValidationError::ZeroDuration("store.reprobe.interval_secs"));
        }
        ReprobePolicy::Never
        | ReprobePolicy::Lazy { .. }
        | ReprobePolicy::Interval { .. } => {}
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.request_secs"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.store.host = "  ".into();
        config.store.port = 0;
        config.store.response_timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyHost));
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::ZeroDuration("store.response_timeout_ms")));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = ServiceConfig::default();
        config.store.reprobe = ReprobePolicy::Interval { interval_secs: 0 };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::ZeroDuration("store.reprobe.interval_secs")]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
