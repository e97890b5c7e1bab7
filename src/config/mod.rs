//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! built-in defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment overrides (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; there is no reload path
//! - All fields have defaults to allow running with no file at all
//! - A port that cannot be parsed is fatal; an unreachable host is not

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::{
    InstanceConfig, ListenerConfig, LogFormat, ObservabilityConfig, ReprobePolicy, ServiceConfig,
    StoreConfig, TimeoutConfig,
};
