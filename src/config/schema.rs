//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the counter service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Counter store connection settings.
    pub store: StoreConfig,

    /// Identity reported in responses.
    pub instance: InstanceConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Counter store (Redis protocol) configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store hostname or IP address.
    pub host: String,

    /// Store TCP port.
    pub port: u16,

    /// Optional password sent with AUTH.
    pub credential: Option<String>,

    /// Key of the shared counter.
    pub counter_key: String,

    /// Bound on establishing the TCP connection, in milliseconds.
    pub connect_timeout_ms: u64,

    /// Bound on a single command round trip, in milliseconds.
    pub response_timeout_ms: u64,

    /// When, if ever, the reachability probe is repeated.
    pub reprobe: ReprobePolicy,
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Upper bound on a full probe (connect plus PING).
    pub fn probe_deadline(&self) -> Duration {
        self.connect_timeout() + self.response_timeout()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            credential: None,
            counter_key: "api_hit_count".to_string(),
            connect_timeout_ms: 2_000,
            response_timeout_ms: 2_000,
            reprobe: ReprobePolicy::default(),
        }
    }
}

// Hand-written so the credential never reaches a log line.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("counter_key", &self.counter_key)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("reprobe", &self.reprobe)
            .finish()
    }
}

/// Re-probe policy for the store connection state.
///
/// `Never` keeps the startup probe result for the whole process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReprobePolicy {
    #[default]
    Never,
    /// A failed increment marks the store dead; the next counter request
    /// after `cooldown_secs` probes again.
    Lazy {
        #[serde(default = "default_lazy_cooldown")]
        cooldown_secs: u64,
    },
    /// A background task probes every `interval_secs`.
    Interval {
        #[serde(default = "default_probe_interval")]
        interval_secs: u64,
    },
}

pub(crate) fn default_lazy_cooldown() -> u64 {
    5
}

pub(crate) fn default_probe_interval() -> u64 {
    15
}

/// Instance identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Opaque identifier of this process instance.
    pub id: String,

    /// Service name reported by the health endpoint.
    pub service_name: String,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            id: "local-dev".to_string(),
            service_name: "backend-api".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address for the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
