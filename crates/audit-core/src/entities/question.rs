use serde::{Deserialize, Serialize};

/// A catalog question. Read-only snapshot taken at reconciliation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionDefinition {
    pub question_id: String,
    pub section_id: Option<String>,
    pub text: String,
    pub sort_order: Option<i64>,
}

impl QuestionDefinition {
    /// Ordering key; a missing sort order sorts as 0.
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        self.sort_order.unwrap_or(0)
    }
}

/// A predefined classification option for violations under one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubAnswer {
    pub sub_answer_id: String,
    pub question_id: Option<String>,
    pub text: String,
}
