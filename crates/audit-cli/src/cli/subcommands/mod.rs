mod audit;
mod violation;

pub use audit::AuditCommands;
pub use violation::{ViolationCommands, ViolationEditArgs};
