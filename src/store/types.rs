//! Store error definitions.

use std::time::Duration;
use thiserror::Error;

use crate::health::state::ConnectionState;

/// Errors that can occur while talking to the counter store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A client handle could not be built from the configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// The cached connection state forbids store calls.
    #[error("Store not available (state: {0})")]
    Unavailable(ConnectionState),

    /// The call did not complete within its deadline.
    #[error("Store call timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Network, protocol or authentication failure reported by the client.
    #[error("Store call failed: {0}")]
    Call(#[from] redis::RedisError),

    /// The store answered, but not with what the command expects.
    #[error("Unexpected store reply: {0}")]
    UnexpectedReply(String),
}

impl StoreError {
    /// Stable machine-readable identifier for API error bodies and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidConfig(_) => "invalid_config",
            StoreError::Unavailable(_) => "store_unavailable",
            StoreError::Timeout(_) => "store_timeout",
            StoreError::Call(_) | StoreError::UnexpectedReply(_) => "store_call_failed",
        }
    }

    /// True when the failure came from the store round trip itself.
    pub fn is_call_failure(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout(_) | StoreError::Call(_) | StoreError::UnexpectedReply(_)
        )
    }

    /// True when the connection the call went over can no longer be used.
    /// Error replies from the store itself leave the connection intact.
    pub fn is_connection_lost(&self) -> bool {
        match self {
            StoreError::Timeout(_) => true,
            StoreError::Call(e) => {
                e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
            }
            _ => false,
        }
    }

    /// Classify a client error, folding client-side response timeouts into
    /// [`StoreError::Timeout`].
    pub(crate) fn from_redis(err: redis::RedisError, deadline: Duration) -> Self {
        if err.is_timeout() {
            StoreError::Timeout(deadline)
        } else {
            StoreError::Call(err)
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Store call timed out after 1500 ms");

        let err = StoreError::Unavailable(ConnectionState::Dead);
        assert_eq!(err.to_string(), "Store not available (state: dead)");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(StoreError::Unavailable(ConnectionState::Dead).kind(), "store_unavailable");
        assert_eq!(StoreError::Timeout(Duration::from_secs(1)).kind(), "store_timeout");
        assert_eq!(StoreError::UnexpectedReply("x".into()).kind(), "store_call_failed");
        assert!(!StoreError::Unavailable(ConnectionState::Unestablished).is_call_failure());
        assert!(StoreError::Timeout(Duration::from_secs(1)).is_call_failure());
    }

    #[test]
    fn test_redis_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from(redis::RedisError::from(io));
        assert_eq!(err.kind(), "store_call_failed");
        assert!(err.to_string().starts_with("Store call failed"));
    }

    #[test]
    fn test_connection_lost_classification() {
        assert!(StoreError::Timeout(Duration::from_millis(500)).is_connection_lost());
        assert!(!StoreError::Unavailable(ConnectionState::Alive).is_connection_lost());
        assert!(!StoreError::UnexpectedReply("x".into()).is_connection_lost());

        let reply = redis::RedisError::from((redis::ErrorKind::TypeError, "not an integer"));
        assert!(!StoreError::Call(reply).is_connection_lost());
    }

    #[test]
    fn test_client_timeout_maps_to_timeout() {
        let timed_out = redis::RedisError::from(std::io::Error::from(std::io::ErrorKind::TimedOut));
        let err = StoreError::from_redis(timed_out, Duration::from_millis(500));
        assert!(matches!(err, StoreError::Timeout(d) if d == Duration::from_millis(500)));

        let refused = redis::RedisError::from(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert!(matches!(
            StoreError::from_redis(refused, Duration::from_millis(500)),
            StoreError::Call(_)
        ));
    }
}
