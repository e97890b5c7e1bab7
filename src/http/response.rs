//! Error responses.
//!
//! Store failures never turn into a 2xx:
//! - state not alive → 503 Service Unavailable
//! - store call failed → 502 Bad Gateway
//! - store call timed out → 504 Gateway Timeout

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

/// Handler error wrapping a store failure.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            StoreError::Call(_) | StoreError::UnexpectedReply(_) => StatusCode::BAD_GATEWAY,
            StoreError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self.0 {
            StoreError::Unavailable(_) => ErrorBody {
                error: "Database unavailable",
                kind: None,
            },
            StoreError::Timeout(_) => ErrorBody {
                error: "Database request timed out",
                kind: Some(self.0.kind()),
            },
            _ => ErrorBody {
                error: "Database request failed",
                kind: Some(self.0.kind()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::state::ConnectionState;
    use std::time::Duration;

    #[test]
    fn test_unavailable_maps_to_503() {
        let err = ApiError::from(StoreError::Unavailable(ConnectionState::Dead));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            serde_json::to_value(err.body()).unwrap(),
            serde_json::json!({"error": "Database unavailable"})
        );
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let err = ApiError::from(StoreError::Timeout(Duration::from_secs(2)));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.body().kind, Some("store_timeout"));
    }

    #[test]
    fn test_call_failure_maps_to_502() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = ApiError::from(StoreError::from(redis::RedisError::from(io)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.body().error, "Database request failed");
        assert_eq!(err.body().kind, Some("store_call_failed"));
    }
}
