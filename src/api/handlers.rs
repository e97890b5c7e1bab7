use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::health::state::ConnectionState;
use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::StoreError;

/// Fixed value returned by the info endpoint.
pub const SECRET_CODE: u32 = 12345;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub database_connected: bool,
    pub store_state: ConnectionState,
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub message: &'static str,
    pub pod_name: String,
    pub secret_code: u32,
}

#[derive(Debug, Serialize)]
pub struct CounterResponse {
    pub message: &'static str,
    pub total_hits: i64,
    pub served_by: String,
}

/// Liveness. Always 200; store reachability is reported in the body.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_state = state.store.state();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            service: state.instance.service_name.clone(),
            database_connected: store_state.is_alive(),
            store_state,
        }),
    )
}

pub async fn get_data(State(state): State<AppState>) -> (StatusCode, Json<DataResponse>) {
    (
        StatusCode::OK,
        Json(DataResponse {
            message: "Hello from the Rust backend!",
            pod_name: state.instance.id.clone(),
            secret_code: SECRET_CODE,
        }),
    )
}

/// Increment the shared counter and return the store's new value.
pub async fn get_counter(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<CounterResponse>), ApiError> {
    let request_id = headers.request_id();

    let gate = match &state.lazy_reprobe {
        Some(lazy) => lazy.ensure(&state.store).await,
        None => state.store.state(),
    };
    if !gate.is_alive() {
        tracing::debug!(request_id, state = %gate, "Counter rejected, store not alive");
        return Err(StoreError::Unavailable(gate).into());
    }

    match state.store.increment(&state.counter_key).await {
        Ok(total_hits) => {
            tracing::debug!(request_id, total_hits, "Counter served");
            Ok((
                StatusCode::OK,
                Json(CounterResponse {
                    message: "Database request successful",
                    total_hits,
                    served_by: state.instance.id.clone(),
                }),
            ))
        }
        Err(e) => {
            tracing::warn!(request_id, error = %e, "Counter request failed");
            if let Some(lazy) = &state.lazy_reprobe {
                lazy.record_failure(&state.store, &e);
            }
            Err(e.into())
        }
    }
}
