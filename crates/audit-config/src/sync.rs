//! Submission tuning.

use serde::{Deserialize, Serialize};

/// Default fan-out for score pushes and violation uploads.
const fn default_max_parallel() -> usize {
    4
}

/// Default attempts for idempotent catalog reads.
const fn default_read_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Maximum concurrent remote calls during finalize.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Attempts (including the first) for catalog reads on transient failures.
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            read_retries: default_read_retries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SyncConfig::default();
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.read_retries, 3);
    }
}
