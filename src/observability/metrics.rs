//! Metrics collection and exposition.
//!
//! # Metrics
//! - `counter_service_requests_total` (counter): requests by method, path, status
//! - `counter_service_request_duration_seconds` (histogram): latency distribution
//! - `counter_service_store_calls_total` (counter): store commands by op, outcome
//! - `counter_service_store_call_duration_seconds` (histogram): store round trips
//! - `counter_service_store_alive` (gauge): 1=alive, 0=not alive
//! - `counter_service_store_reconnects_total` (counter): connections reopened after a broken one
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::health::state::ConnectionState;

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed inbound request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "counter_service_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "counter_service_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a store command round trip.
pub fn record_store_call(op: &'static str, outcome: &'static str, start: Instant) {
    counter!("counter_service_store_calls_total", "op" => op, "outcome" => outcome).increment(1);
    histogram!("counter_service_store_call_duration_seconds", "op" => op)
        .record(start.elapsed().as_secs_f64());
}

/// Record the current store connection state.
pub fn record_store_state(state: ConnectionState) {
    gauge!("counter_service_store_alive").set(if state.is_alive() { 1.0 } else { 0.0 });
}

/// Record a store connection reopened after the previous one broke.
pub fn record_store_reconnect() {
    counter!("counter_service_store_reconnects_total").increment(1);
}
