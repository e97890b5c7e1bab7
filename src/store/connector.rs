//! Counter store connector.
//!
//! # Responsibilities
//! - Build a client handle from configuration (no network I/O)
//! - Probe reachability with a bounded PING round trip
//! - Issue the atomic INCR on demand
//! - Own the cached connection state that gates store calls

use arc_swap::ArcSwapOption;
use redis::aio::MultiplexedConnection;
use redis::AsyncConnectionConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::StoreConfig;
use crate::health::state::{ConnectionState, StateCell};
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::store::types::{StoreError, StoreResult};

/// Handle to the counter store.
///
/// The underlying multiplexed connection is cloned per call, so any number
/// of requests can have commands in flight at once. It is replaced when a
/// probe succeeds or after a call finds it broken.
pub struct StoreConnector {
    client: redis::Client,
    connection: ArcSwapOption<MultiplexedConnection>,
    state: StateCell,
    endpoint: String,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl StoreConnector {
    /// Build a client handle. Reachability is not checked here; call
    /// [`StoreConnector::probe`] for that.
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let url = connection_url(config)?;
        let client = redis::Client::open(url.as_str())
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            connection: ArcSwapOption::empty(),
            state: StateCell::new(),
            endpoint: format!("{}:{}", config.host, config.port),
            connect_timeout: config.connect_timeout(),
            response_timeout: config.response_timeout(),
        })
    }

    /// Current cached connection state.
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// `host:port` of the store, for logs.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open a fresh connection and PING it.
    ///
    /// The outcome replaces the cached state: `Alive` only on a `PONG` reply,
    /// `Dead` on any network, authentication or timeout failure. Never takes
    /// longer than connect timeout plus response timeout.
    pub async fn probe(&self) -> ConnectionState {
        let start = Instant::now();
        let next = match self.open_and_ping().await {
            Ok(conn) => {
                self.connection.store(Some(Arc::new(conn)));
                metrics::record_store_call("ping", "ok", start);
                tracing::info!(endpoint = %self.endpoint, "Store probe succeeded");
                ConnectionState::Alive
            }
            Err(e) => {
                self.connection.store(None);
                metrics::record_store_call("ping", e.kind(), start);
                tracing::warn!(
                    endpoint = %self.endpoint,
                    error = %e,
                    "Store probe failed; store-backed endpoints disabled"
                );
                ConnectionState::Dead
            }
        };

        self.state.set(next);
        metrics::record_store_state(next);
        next
    }

    /// PING over the existing connection, falling back to a full probe when
    /// there is none or the PING fails.
    pub async fn recheck(&self) -> ConnectionState {
        let Some(conn) = self.connection.load_full() else {
            return self.probe().await;
        };

        let mut conn = (*conn).clone();
        let start = Instant::now();
        match with_deadline(self.response_timeout, ping(&mut conn)).await {
            Ok(()) => {
                metrics::record_store_call("ping", "ok", start);
                self.state.set(ConnectionState::Alive);
                metrics::record_store_state(ConnectionState::Alive);
                ConnectionState::Alive
            }
            Err(e) => {
                metrics::record_store_call("ping", e.kind(), start);
                tracing::debug!(endpoint = %self.endpoint, error = %e, "PING on cached connection failed, reconnecting");
                self.probe().await
            }
        }
    }

    /// Mark the store dead after a failed call. No-op unless currently alive.
    pub fn mark_dead(&self) {
        if self.state.demote() {
            metrics::record_store_state(ConnectionState::Dead);
        }
    }

    /// Atomically increment `key` at the store and return its new value.
    ///
    /// One `INCR` round trip; the store serializes concurrent increments, so
    /// no update is ever lost. Not retried on failure. A failure that leaves
    /// the connection unusable drops it, and the next call opens a fresh one.
    /// The cached state is not changed by either.
    pub async fn increment(&self, key: &str) -> StoreResult<i64> {
        let state = self.state.get();
        if !state.is_alive() {
            return Err(StoreError::Unavailable(state));
        }

        let start = Instant::now();
        let result = match self.current_connection().await {
            Ok(conn) => {
                let result = self.incr(&conn, key).await;
                if matches!(&result, Err(e) if e.is_connection_lost()) {
                    self.discard(&conn);
                }
                result
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(value) => {
                metrics::record_store_call("incr", "ok", start);
                tracing::debug!(key, value, "Counter incremented");
            }
            Err(e) => {
                metrics::record_store_call("incr", e.kind(), start);
                tracing::error!(endpoint = %self.endpoint, key, error = %e, "Counter increment failed");
            }
        }
        result
    }

    async fn incr(&self, conn: &MultiplexedConnection, key: &str) -> StoreResult<i64> {
        let mut conn = conn.clone();
        let deadline = self.response_timeout;
        with_deadline(deadline, async move {
            redis::cmd("INCR")
                .arg(key)
                .query_async(&mut conn)
                .await
                .map_err(|e| StoreError::from_redis(e, deadline))
        })
        .await
    }

    /// The cached connection, or a freshly opened one when it was dropped.
    async fn current_connection(&self) -> StoreResult<Arc<MultiplexedConnection>> {
        if let Some(conn) = self.connection.load_full() {
            return Ok(conn);
        }

        let deadline = self.connect_timeout + self.response_timeout;
        let conn = Arc::new(with_deadline(deadline, self.open()).await?);
        self.connection.store(Some(conn.clone()));
        tracing::info!(endpoint = %self.endpoint, "Reopened store connection");
        metrics::record_store_reconnect();
        Ok(conn)
    }

    /// Drop `conn` from the cache unless another call already replaced it.
    fn discard(&self, conn: &Arc<MultiplexedConnection>) {
        let current = Some(conn.clone());
        let previous = self.connection.compare_and_swap(&current, None);
        if matches!(&*previous, Some(p) if Arc::ptr_eq(p, conn)) {
            tracing::warn!(endpoint = %self.endpoint, "Dropped broken store connection");
        }
    }

    async fn open(&self) -> StoreResult<MultiplexedConnection> {
        let config = AsyncConnectionConfig::new()
            .set_connection_timeout(self.connect_timeout)
            .set_response_timeout(self.response_timeout);
        Ok(self
            .client
            .get_multiplexed_async_connection_with_config(&config)
            .await?)
    }

    async fn open_and_ping(&self) -> StoreResult<MultiplexedConnection> {
        let deadline = self.connect_timeout + self.response_timeout;
        with_deadline(deadline, async {
            let mut conn = self.open().await?;
            ping(&mut conn).await?;
            Ok::<_, StoreError>(conn)
        })
        .await
    }
}

async fn ping(conn: &mut MultiplexedConnection) -> StoreResult<()> {
    let reply: String = redis::cmd("PING").query_async(conn).await?;
    if reply == "PONG" {
        Ok(())
    } else {
        Err(StoreError::UnexpectedReply(reply))
    }
}

/// `redis://[:credential@]host:port/` with the credential percent-encoded.
fn connection_url(config: &StoreConfig) -> StoreResult<Url> {
    let host = config.host.trim();
    if host.is_empty() {
        return Err(StoreError::InvalidConfig("store host is empty".to_string()));
    }

    let mut url = Url::parse("redis://localhost/")
        .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;

    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    url.set_host(Some(&host))
        .map_err(|e| StoreError::InvalidConfig(format!("invalid store host '{}': {}", host, e)))?;
    url.set_port(Some(config.port))
        .map_err(|_| StoreError::InvalidConfig("store URL cannot carry a port".to_string()))?;

    if let Some(credential) = &config.credential {
        url.set_password(Some(credential))
            .map_err(|_| StoreError::InvalidConfig("store URL cannot carry a credential".to_string()))?;
    }

    Ok(url)
}

impl std::fmt::Debug for StoreConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConnector")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state.get())
            .field("connect_timeout", &self.connect_timeout)
            .field("response_timeout", &self.response_timeout)
            .finish()
    }
}
