//! Timeout enforcement.
//!
//! Every store call runs under a deadline. An elapsed deadline drops the
//! pending future; a command already written to the socket may still be
//! applied by the store.

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::store::{StoreError, StoreResult};

/// Run `fut`, failing with [`StoreError::Timeout`] once `deadline` elapses.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(deadline)),
    }
}
