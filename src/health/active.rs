//! Active store health checking.
//!
//! # Responsibilities
//! - Periodically re-check the store (interval re-probe policy)
//! - Update the cached connection state in both directions

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::store::StoreConnector;

pub struct StoreMonitor {
    store: Arc<StoreConnector>,
    interval: Duration,
}

impl StoreMonitor {
    pub fn new(store: Arc<StoreConnector>, interval: Duration) -> Self {
        Self { store, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            endpoint = %self.store.endpoint(),
            "Store monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        // The first tick fires immediately; startup has just probed.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let state = self.store.recheck().await;
                    tracing::debug!(state = %state, "Store re-check complete");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Store monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
