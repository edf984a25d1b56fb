//! # audit-config
//!
//! Layered configuration loading for field audit sync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FIELDAUDIT_*` prefix, `__` as separator)
//! 2. Project-level `.fieldaudit/config.toml`
//! 3. User-level `~/.config/fieldaudit/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FIELDAUDIT_REMOTE__SESSION_ID` -> `remote.session_id`,
//! `FIELDAUDIT_SYNC__MAX_PARALLEL` -> `sync.max_parallel`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use audit_config::AuditConfig;
//!
//! let config = AuditConfig::load_with_dotenv().expect("config");
//! if config.remote.is_configured() {
//!     println!("Record store: {}", config.remote.base_url);
//! }
//! ```

mod error;
mod remote;
mod store;
mod sync;

pub use error::ConfigError;
pub use remote::RemoteConfig;
pub use store::StoreConfig;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local configuration directory.
pub const PROJECT_DIR: &str = ".fieldaudit";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AuditConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("FIELDAUDIT_").split("__"))
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.max_parallel == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sync.max_parallel".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "remote.timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fieldaudit").join("config.toml"))
    }
}
