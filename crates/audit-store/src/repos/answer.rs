//! Answer draft repository.
//!
//! Rows keep the reconciled display order in `position`.

use audit_core::entities::AnswerRecord;

use crate::AuditStore;
use crate::error::StoreError;
use crate::helpers::get_opt_string;
use crate::repos::position;

fn row_to_answer(row: &libsql::Row) -> Result<AnswerRecord, StoreError> {
    Ok(AnswerRecord {
        answer_id: row.get::<String>(0)?,
        question_id: row.get::<String>(1)?,
        score: get_opt_string(row, 2)?,
        question_text_snapshot: row.get::<String>(3)?,
    })
}

impl AuditStore {
    /// Replace every answer row of `audit_id` with `answers`, in order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if any statement fails; the transaction is then
    /// rolled back and the previous rows stay.
    pub async fn replace_answers(
        &self,
        audit_id: &str,
        answers: &[AnswerRecord],
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let tx = self.conn.transaction().await?;
        tx.execute("DELETE FROM answer_drafts WHERE audit_id = ?1", [audit_id])
            .await?;
        for (idx, answer) in answers.iter().enumerate() {
            tx.execute(
                "INSERT INTO answer_drafts
                 (audit_id, answer_id, question_id, score, question_text_snapshot, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    audit_id,
                    answer.answer_id.as_str(),
                    answer.question_id.as_str(),
                    answer.score.as_deref(),
                    answer.question_text_snapshot.as_str(),
                    position(idx),
                ],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Answers of `audit_id` in stored order. Empty when none were saved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or a row cannot be decoded.
    pub async fn list_answers(&self, audit_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT answer_id, question_id, score, question_text_snapshot
                 FROM answer_drafts WHERE audit_id = ?1 ORDER BY position",
                [audit_id],
            )
            .await?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next().await? {
            answers.push(row_to_answer(&row)?);
        }
        Ok(answers)
    }
}
