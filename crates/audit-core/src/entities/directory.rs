use serde::{Deserialize, Serialize};

/// A person who can audit or be audited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub employee_id: String,
    /// Family name first, as the record store lists people.
    pub display_name: String,
}

/// A checklist section an audit can cover.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub section_id: String,
    pub name: String,
}
