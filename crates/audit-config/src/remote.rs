//! Record store (remote API) configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default per-request timeout in seconds. Sized for photo uploads.
const fn default_timeout_secs() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://api.directual.com/good/api/v5/data".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Root of the data API; structure endpoints are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Multipart upload endpoint for photos.
    #[serde(default)]
    pub upload_url: String,

    /// Prefix joined with the uploaded file name to form the public photo URL.
    #[serde(default)]
    pub file_base_url: String,

    /// Application identifier sent with every request.
    #[serde(default)]
    pub app_id: String,

    /// Network identifier sent with every request (optional).
    #[serde(default)]
    pub network_id: String,

    /// Session credential obtained by the login flow.
    #[serde(default)]
    pub session_id: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_url: String::new(),
            file_base_url: String::new(),
            app_id: String::new(),
            network_id: String::new(),
            session_id: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// Check if the minimum fields for talking to the record store are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fail with `ConfigError::NotConfigured` listing every missing field.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` if any required field is empty.
    pub fn require_configured(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::NotConfigured {
                section: "remote".into(),
                missing: missing.join(", "),
            })
        }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("base_url", &self.base_url),
            ("upload_url", &self.upload_url),
            ("app_id", &self.app_id),
            ("session_id", &self.session_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = RemoteConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout_secs, 30);
        assert!(config.base_url.starts_with("https://"));
    }

    #[test]
    fn configured_when_required_fields_set() {
        let config = RemoteConfig {
            upload_url: "https://audit.example/api/upload".into(),
            app_id: "app-1".into(),
            session_id: "sess-1".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert!(config.require_configured().is_ok());
    }

    #[test]
    fn missing_fields_are_named() {
        let config = RemoteConfig {
            app_id: "app-1".into(),
            ..Default::default()
        };
        let err = config.require_configured().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("upload_url"), "{msg}");
        assert!(msg.contains("session_id"), "{msg}");
        assert!(!msg.contains("app_id"), "{msg}");
    }
}
