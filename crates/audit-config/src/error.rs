//! Errors raised while loading or checking configuration.

use thiserror::Error;

/// Why a usable configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error (bad TOML, wrong types in env vars).
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A section the requested command depends on is missing required fields.
    #[error("Configuration section '{section}' is not configured (missing: {missing})")]
    NotConfigured { section: String, missing: String },

    /// A configuration field has a value the engine cannot run with.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
