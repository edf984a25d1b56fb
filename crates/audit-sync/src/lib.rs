//! # audit-sync
//!
//! Offline-first synchronization for one field audit at a time.
//!
//! - [`reconcile`] makes the remote answer list match the question catalog.
//! - [`ViolationQueue`] keeps captured violations durable between runs.
//! - [`AuditSessionEngine`] ties both together and runs the finalize protocol,
//!   which pushes scores, uploads photos and creates violation records with
//!   bounded concurrency, then closes the audit once nothing is pending.
//!
//! The engine only talks to the collaborator traits in `audit_core::ports`.

pub mod engine;
pub mod error;
pub mod queue;
pub mod reconcile;
mod submit;

pub use engine::{
    AuditSessionEngine, DEFAULT_MAX_PARALLEL, EngineContext, create_audit, list_employees,
    list_sections,
};
pub use error::SyncError;
pub use queue::ViolationQueue;
pub use reconcile::{Reconciliation, reconcile};
