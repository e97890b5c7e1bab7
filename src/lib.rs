//! Counter service library.
//!
//! An HTTP service exposing health, static info, and a shared counter kept
//! in a Redis-protocol store. The store connection is probed once at startup
//! and the result gates the counter endpoint.

pub mod api;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::ServiceConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
pub use store::StoreConnector;
