//! Passive store health checking (lazy re-probe policy).
//!
//! # Responsibilities
//! - Demote the store to Dead when an increment fails at the store
//! - Re-probe on demand from a counter request, at most once per cooldown
//!
//! Only one request probes at a time; concurrent requests see the state as
//! it was and are answered without waiting.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::health::state::ConnectionState;
use crate::store::{StoreConnector, StoreError};

pub struct LazyReprobe {
    cooldown: Duration,
    last_attempt: Mutex<Instant>,
}

impl LazyReprobe {
    /// The startup probe counts as the first attempt.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_attempt: Mutex::new(Instant::now()),
        }
    }

    /// Return the state to gate on, probing first if the store is not alive
    /// and the cooldown has elapsed.
    pub async fn ensure(&self, store: &StoreConnector) -> ConnectionState {
        let state = store.state();
        if state.is_alive() {
            return state;
        }

        let Ok(mut last) = self.last_attempt.try_lock() else {
            return state;
        };
        if last.elapsed() < self.cooldown {
            return state;
        }
        *last = Instant::now();

        tracing::info!(endpoint = %store.endpoint(), previous = %state, "Re-probing store");
        store.probe().await
    }

    /// Note a failed store call; failures of the call itself demote the state.
    pub fn record_failure(&self, store: &StoreConnector, error: &StoreError) {
        if error.is_call_failure() {
            store.mark_dead();
        }
    }
}
