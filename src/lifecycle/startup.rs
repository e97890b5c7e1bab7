//! Startup orchestration.
//!
//! Order: connector handle → bounded probe → handler state. An unreachable
//! store is not a startup failure; a configuration that cannot produce a
//! client handle is.

use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, ServiceConfig};
use crate::http::server::AppState;
use crate::store::{StoreConnector, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration invalid: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot build store client: {0}")]
    Store(#[from] StoreError),

    #[error("cannot bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

/// Build the connector, probe the store once, and assemble handler state.
pub async fn prepare(config: &ServiceConfig) -> Result<AppState, StartupError> {
    let store = StoreConnector::connect(&config.store)?;

    tracing::info!(
        endpoint = %store.endpoint(),
        credential = config.store.credential.is_some(),
        deadline_ms = config.store.probe_deadline().as_millis() as u64,
        "Probing store"
    );
    let state = store.probe().await;
    if !state.is_alive() {
        tracing::warn!(
            endpoint = %store.endpoint(),
            reprobe = ?config.store.reprobe,
            "Store unreachable at startup; serving without the counter"
        );
    }

    Ok(AppState::new(Arc::new(store), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ConnectionState;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_unreachable_store_is_not_fatal() {
        let mut config = ServiceConfig::default();
        config.store.host = "127.0.0.1".into();
        config.store.port = 1;
        config.store.connect_timeout_ms = 200;
        config.store.response_timeout_ms = 200;

        let start = Instant::now();
        let state = prepare(&config).await.unwrap();
        assert_eq!(state.store.state(), ConnectionState::Dead);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_host_is_fatal() {
        let mut config = ServiceConfig::default();
        config.store.host = String::new();
        assert!(matches!(prepare(&config).await, Err(StartupError::Store(_))));
    }
}
