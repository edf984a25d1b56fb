//! Repository modules, one per draft table.
//!
//! Each module adds methods to `AuditStore` via `impl AuditStore` blocks.

pub mod answer;
pub mod session;
pub mod violation;

/// Convert a list index to the INTEGER `position` column.
pub(crate) fn position(idx: usize) -> i64 {
    i64::try_from(idx).unwrap_or(i64::MAX)
}
