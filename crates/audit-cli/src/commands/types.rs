use serde::Serialize;

use audit_core::entities::{AnswerRecord, AuditSession, ViolationEntry};
use audit_core::enums::SessionState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: AuditSession,
    pub state: SessionState,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub summary: SessionResponse,
    pub violations: Vec<ViolationEntry>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub answer_id: String,
    pub score: Option<String>,
    /// Whether the score already reached the record store.
    pub pushed: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureResponse {
    Captured { violation: ViolationEntry },
    Cancelled,
}
