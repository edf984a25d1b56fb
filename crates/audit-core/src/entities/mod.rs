//! Entity structs for the audit aggregate.
//!
//! `AuditSession` is the root. Each session owns one `AnswerRecord` per
//! `QuestionDefinition` in its section, and each answer owns any number of
//! locally captured `ViolationEntry` values. `Employee` and `Section` are
//! the choices offered when a new audit is created.

mod answer;
mod directory;
mod question;
mod session;
mod violation;

pub use answer::AnswerRecord;
pub use directory::{Employee, Section};
pub use question::{QuestionDefinition, SubAnswer};
pub use session::{AuditDraft, AuditSession};
pub use violation::{ViolationEdit, ViolationEntry, ViolationMap};
