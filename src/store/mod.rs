//! Counter store subsystem.
//!
//! # Data Flow
//! ```text
//! StoreConfig (host, port, credential, timeouts)
//!     → connector.rs (client handle, probe, INCR)
//!     → health::state (cached Alive/Dead gate)
//!     → api handlers (counter endpoint)
//! ```
//!
//! # Constraints
//! - The increment is a single server-side INCR, never GET then SET
//! - Every store call is bounded by a timeout
//! - Failures are reported, never retried here
//! - Credentials are never logged

pub mod connector;
pub mod types;

pub use connector::StoreConnector;
pub use types::{StoreError, StoreResult};
