//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, CORS, metrics)
//! - Start the store monitor when the interval re-probe policy is on
//! - Serve until the shutdown signal fires

use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::{InstanceConfig, ReprobePolicy, ServiceConfig};
use crate::health::{LazyReprobe, StoreMonitor};
use crate::http::middleware::track_metrics;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::store::StoreConnector;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreConnector>,
    pub lazy_reprobe: Option<Arc<LazyReprobe>>,
    pub counter_key: Arc<str>,
    pub instance: Arc<InstanceConfig>,
}

impl AppState {
    /// Wire an already probed connector into handler state.
    pub fn new(store: Arc<StoreConnector>, config: &ServiceConfig) -> Self {
        let lazy_reprobe = match config.store.reprobe {
            ReprobePolicy::Lazy { cooldown_secs } => {
                Some(Arc::new(LazyReprobe::new(Duration::from_secs(cooldown_secs))))
            }
            ReprobePolicy::Never | ReprobePolicy::Interval { .. } => None,
        };

        Self {
            store,
            lazy_reprobe,
            counter_key: Arc::from(config.store.counter_key.as_str()),
            instance: Arc::new(config.instance.clone()),
        }
    }
}

/// HTTP server for the counter service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        api::routes()
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CorsLayer::permissive())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestId))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            instance = %self.state.instance.id,
            "HTTP server starting"
        );

        if let ReprobePolicy::Interval { interval_secs } = self.config.store.reprobe {
            let monitor = StoreMonitor::new(
                self.state.store.clone(),
                Duration::from_secs(interval_secs),
            );
            tokio::spawn(monitor.run(shutdown_rx.resubscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
