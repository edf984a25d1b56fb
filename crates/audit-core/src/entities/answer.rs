use serde::{Deserialize, Serialize};

/// The persisted score and question wording for one question of one audit
/// (the remote `audit_question` record).
///
/// Records held by this crate always come back from the record store, so
/// `answer_id` is always known. Creating a record that does not exist yet goes
/// through `MutationClient::upsert_answer(None, ..)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRecord {
    pub answer_id: String,
    pub question_id: String,
    pub score: Option<String>,
    /// Question text copied at creation; later catalog edits do not change it.
    pub question_text_snapshot: String,
}
