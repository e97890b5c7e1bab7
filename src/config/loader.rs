//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{default_lazy_cooldown, default_probe_interval, ReprobePolicy, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the startup configuration: defaults, then the optional file, then
/// the process environment.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable environment lookup.
pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// First non-empty value among `keys`, with the key that supplied it.
fn first_set<F>(lookup: &F, keys: &[&'static str]) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .find_map(|key| lookup(key).filter(|v| !v.is_empty()).map(|v| (*key, v)))
}

/// Apply recognized environment variables on top of `config`.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some((_, host)) = first_set(&lookup, &["STORE_HOST", "REDIS_HOST"]) {
        config.store.host = host;
    }

    if let Some((var, raw)) = first_set(&lookup, &["STORE_PORT", "REDIS_PORT"]) {
        config.store.port = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnv {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Some((_, credential)) = first_set(&lookup, &["STORE_CREDENTIAL", "REDIS_PASSWORD"]) {
        config.store.credential = Some(credential);
    }

    if let Some((_, id)) = first_set(&lookup, &["INSTANCE_ID", "HOSTNAME"]) {
        config.instance.id = id;
    }

    if let Some((_, bind)) = first_set(&lookup, &["BIND_ADDRESS"]) {
        config.listener.bind_address = bind;
    }

    if let Some((var, mode)) = first_set(&lookup, &["STORE_REPROBE"]) {
        config.store.reprobe = match mode.trim().to_ascii_lowercase().as_str() {
            "never" => ReprobePolicy::Never,
            "lazy" => ReprobePolicy::Lazy {
                cooldown_secs: default_lazy_cooldown(),
            },
            "interval" => ReprobePolicy::Interval {
                interval_secs: default_probe_interval(),
            },
            _ => {
                return Err(ConfigError::InvalidEnv {
                    var,
                    value: mode,
                    reason: "expected one of never, lazy, interval".to_string(),
                })
            }
        };
    }

    if let Some((var, raw)) = first_set(&lookup, &["STORE_REPROBE_SECS"]) {
        let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::InvalidEnv {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;
        match &mut config.store.reprobe {
            ReprobePolicy::Never => {
                return Err(ConfigError::InvalidEnv {
                    var,
                    value: raw,
                    reason: "re-probing is disabled; set STORE_REPROBE to lazy or interval"
                        .to_string(),
                })
            }
            ReprobePolicy::Lazy { cooldown_secs } => *cooldown_secs = secs,
            ReprobePolicy::Interval { interval_secs } => *interval_secs = secs,
        }
    }

    Ok(())
}
