//! Prefixed local ID generation.
//!
//! Locally originated entities get IDs of the form `{prefix}-{16 hex}`.
//! Remote-assigned IDs (audits, answers) are stored verbatim.

use std::fmt::Write;

use crate::errors::CoreError;

/// Prefix for locally captured violation entries.
pub const PREFIX_VIOLATION: &str = "vio";

/// Number of random bytes behind each local ID.
const RANDOM_BYTES: usize = 8;

/// Generate a prefixed local ID, e.g. `"vio-3fa2b8c10d9e7a41"`.
///
/// # Errors
///
/// Returns `CoreError::Random` if the OS random source is unavailable.
pub fn generate_local_id(prefix: &str) -> Result<String, CoreError> {
    let mut bytes = [0u8; RANDOM_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| CoreError::Random(e.to_string()))?;

    let mut id = String::with_capacity(prefix.len() + 1 + RANDOM_BYTES * 2);
    id.push_str(prefix);
    id.push('-');
    for byte in bytes {
        let _ = write!(id, "{byte:02x}");
    }
    Ok(id)
}
