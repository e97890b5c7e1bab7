//! Store connection state machine.
//!
//! # States
//! - Unestablished: no probe has completed yet
//! - Alive: the last probe got a correct PING reply
//! - Dead: the last probe failed, or (lazy policy) an increment failed
//!
//! # State Transitions
//! ```text
//! Unestablished → Alive: probe succeeds
//! Unestablished → Dead:  probe fails
//! Dead ↔ Alive:          only under a lazy or interval re-probe policy
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Reachability of the counter store as last observed.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Unestablished = 0,
    Alive = 1,
    Dead = 2,
}

impl From<u8> for ConnectionState {
    fn from(val: u8) -> Self {
        match val {
            1 => ConnectionState::Alive,
            2 => ConnectionState::Dead,
            _ => ConnectionState::Unestablished,
        }
    }
}

impl ConnectionState {
    pub fn is_alive(self) -> bool {
        self == ConnectionState::Alive
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Unestablished => "unestablished",
            ConnectionState::Alive => "alive",
            ConnectionState::Dead => "dead",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free cell holding the current [`ConnectionState`].
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ConnectionState::Unestablished as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from(self.0.load(Ordering::Acquire))
    }

    /// Store `next` and return the previous state.
    pub fn set(&self, next: ConnectionState) -> ConnectionState {
        let prev = ConnectionState::from(self.0.swap(next as u8, Ordering::AcqRel));
        if prev != next {
            tracing::info!(from = %prev, to = %next, "Store connection state changed");
        }
        prev
    }

    /// Move `Alive` to `Dead`; returns false if the state was not `Alive`.
    pub fn demote(&self) -> bool {
        let demoted = self
            .0
            .compare_exchange(
                ConnectionState::Alive as u8,
                ConnectionState::Dead as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if demoted {
            tracing::warn!("Store marked dead after a failed call");
        }
        demoted
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
