//! Store health subsystem.
//!
//! # Data Flow
//! ```text
//! Startup probe (lifecycle::startup):
//!     → StoreConnector::probe
//!     → state.rs (Alive or Dead)
//!
//! Re-probe policy (config store.reprobe):
//!     never    → state fixed for the process lifetime
//!     lazy     → passive.rs: failed INCR demotes, counter requests re-probe
//!     interval → active.rs: background PING on a timer
//! ```
//!
//! # Design Decisions
//! - Health reporting never gates on the state; only the counter does
//! - The default policy keeps the startup result, stale or not

pub mod active;
pub mod passive;
pub mod state;

pub use active::StoreMonitor;
pub use passive::LazyReprobe;
pub use state::ConnectionState;
