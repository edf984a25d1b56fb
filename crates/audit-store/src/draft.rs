//! `DraftStore` implementation backed by the repos.

use async_trait::async_trait;

use audit_core::entities::{AnswerRecord, AuditSession, ViolationMap};
use audit_core::errors::PortError;
use audit_core::ports::DraftStore;

use crate::AuditStore;

#[async_trait]
impl DraftStore for AuditStore {
    async fn save_violations(&self, audit_id: &str, map: &ViolationMap) -> Result<(), PortError> {
        self.replace_violations(audit_id, map).await?;
        tracing::trace!(audit_id, answers = map.len(), "violations saved");
        Ok(())
    }

    async fn load_violations(&self, audit_id: &str) -> Result<ViolationMap, PortError> {
        Ok(self.violation_map(audit_id).await?)
    }

    async fn save_answers(
        &self,
        audit_id: &str,
        answers: &[AnswerRecord],
    ) -> Result<(), PortError> {
        self.replace_answers(audit_id, answers).await?;
        tracing::trace!(audit_id, count = answers.len(), "answers saved");
        Ok(())
    }

    async fn load_answers(&self, audit_id: &str) -> Result<Vec<AnswerRecord>, PortError> {
        Ok(self.list_answers(audit_id).await?)
    }

    async fn save_session(&self, session: &AuditSession) -> Result<(), PortError> {
        Ok(self.put_session(session).await?)
    }

    async fn load_session(&self, audit_id: &str) -> Result<Option<AuditSession>, PortError> {
        Ok(self.get_session(audit_id).await?)
    }
}
