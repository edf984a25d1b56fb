//! Local draft store configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Database file path. Empty means the platform data directory.
    #[serde(default)]
    pub path: String,
}

impl StoreConfig {
    /// Resolve the database path, falling back to `<data dir>/fieldaudit/drafts.db`
    /// and finally to `.fieldaudit/drafts.db` in the current directory.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if !self.path.is_empty() {
            return PathBuf::from(&self.path);
        }
        dirs::data_dir().map_or_else(
            || PathBuf::from(crate::PROJECT_DIR).join("drafts.db"),
            |dir| dir.join("fieldaudit").join("drafts.db"),
        )
    }
}
