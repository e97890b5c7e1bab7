//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Store call:
//!     → timeouts.rs (enforce connect/response deadline)
//!     → On failure: error surfaced to the caller as-is
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store call has a deadline
//! - No retries inside a request; retry policy belongs to callers
//! - A timed-out increment is reported as a failure, never rolled back

pub mod timeouts;
