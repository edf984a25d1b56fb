//! Record writes and photo upload.
//!
//! None of these are retried here. The sync engine decides what to retry,
//! and violation creates carry the entry's local id as `client_ref` so the
//! store can recognize a replay.

use std::path::Path;

use async_trait::async_trait;
use serde::de::IgnoredAny;
use serde_json::{Value, json};

use audit_core::entities::{AnswerRecord, AuditDraft, AuditSession};
use audit_core::errors::PortError;
use audit_core::ports::{
    AnswerFields, AuditSessionUpdate, Envelope, MutationClient, ViolationPayload, ViolationRecord,
};
use audit_core::time::server_timestamp;

use crate::envelope::{map_items, parse_envelope};
use crate::error::RemoteError;
use crate::http::read_body;
use crate::wire::{AnswerRow, AuditRow, UploadResponse, ViolationRow};
use crate::{CREATE_VIOLATION, RecordStoreClient, UPSERT_ANSWER, UPSERT_AUDIT};

const PHOTO_FIELD: &str = "file";
const PHOTO_FILE_NAME: &str = "photo.jpg";
const PHOTO_MIME: &str = "image/jpeg";

// ── Bodies ─────────────────────────────────────────────────────────

pub(crate) fn answer_body(
    answer_id: Option<&str>,
    fields: &AnswerFields,
) -> Result<Value, RemoteError> {
    match (answer_id, fields) {
        (
            id,
            AnswerFields::Create {
                audit_id,
                question_id,
                question_text_snapshot,
            },
        ) => Ok(json!({
            "id": id,
            "audit_id": audit_id,
            "question_id": question_id,
            "score": Value::Null,
            "question_text_snapshot": question_text_snapshot,
        })),
        (Some(id), AnswerFields::Score { score }) => Ok(json!({ "id": id, "score": score })),
        (None, AnswerFields::Score { .. }) => Err(RemoteError::InvalidRequest(
            "a score update needs an answer id".into(),
        )),
    }
}

pub(crate) fn violation_body(payload: &ViolationPayload) -> Value {
    json!({
        "client_ref": payload.client_ref,
        "audit_question_id": payload.answer_id,
        "note": payload.note,
        "foto": payload.photo_remote_url,
        "fix": payload.resolved,
        "sub_answer_id": payload.sub_answer_id,
        "time": server_timestamp(payload.captured_at),
    })
}

pub(crate) fn audit_create_body(draft: &AuditDraft) -> Value {
    json!({
        "auditor": draft.auditor_id,
        "auditee": draft.auditee_id,
        "section": draft.section_id,
        "StartTime": server_timestamp(draft.start_time),
    })
}

pub(crate) fn audit_update_body(audit_id: &str, update: &AuditSessionUpdate) -> Value {
    let mut body = json!({ "id": audit_id });
    if let Some(end_time) = update.end_time {
        body["EndTime"] = Value::String(server_timestamp(end_time));
    }
    body
}

/// Decode the answer endpoint's reply.
///
/// A score update may echo only the posted fields, so its rows are not
/// decoded: the status alone decides success.
pub(crate) fn answer_envelope(
    fields: &AnswerFields,
    body: &str,
) -> Result<Envelope<AnswerRecord>, RemoteError> {
    match fields {
        AnswerFields::Create { .. } => {
            Ok(map_items(parse_envelope::<AnswerRow>(body)?, Into::into))
        }
        AnswerFields::Score { .. } => {
            let env = parse_envelope::<IgnoredAny>(body)?;
            Ok(Envelope {
                ok: env.ok,
                items: Vec::new(),
            })
        }
    }
}

/// Public URL of an uploaded photo, or an error when the store did not name
/// the stored file.
pub(crate) fn photo_url(file_base_url: &str, body: &str) -> Result<String, RemoteError> {
    let parsed: UploadResponse =
        serde_json::from_str(body).map_err(|e| RemoteError::Parse(format!("upload: {e}")))?;
    parsed
        .result
        .and_then(|r| r.final_file_name)
        .filter(|name| !name.is_empty())
        .map(|name| format!("{file_base_url}{name}"))
        .ok_or_else(|| RemoteError::Upload("response carried no finalFileName".into()))
}

// ── Client ─────────────────────────────────────────────────────────

impl RecordStoreClient {
    async fn post(&self, path: &str, body: &Value) -> Result<String, RemoteError> {
        let url = self.endpoint(path, &[]);
        read_body(self.http.post(&url).json(body).send().await?).await
    }
}

#[async_trait]
impl MutationClient for RecordStoreClient {
    async fn create_audit(&self, draft: &AuditDraft) -> Result<Envelope<AuditSession>, PortError> {
        let body = self.post(UPSERT_AUDIT, &audit_create_body(draft)).await?;
        let env = parse_envelope::<AuditRow>(&body)?;
        tracing::info!(ok = env.ok, section_id = %draft.section_id, "audit created");
        Ok(map_items(env, |row| row.into_session(&draft.section_id)))
    }

    async fn upsert_answer(
        &self,
        answer_id: Option<&str>,
        fields: &AnswerFields,
    ) -> Result<Envelope<AnswerRecord>, PortError> {
        let request = answer_body(answer_id, fields)?;
        let body = self.post(UPSERT_ANSWER, &request).await?;
        Ok(answer_envelope(fields, &body)?)
    }

    async fn create_violation(
        &self,
        payload: &ViolationPayload,
    ) -> Result<Envelope<ViolationRecord>, PortError> {
        let body = self.post(CREATE_VIOLATION, &violation_body(payload)).await?;
        let env = parse_envelope::<ViolationRow>(&body)?;
        Ok(map_items(env, Into::into))
    }

    async fn upload_photo(&self, local_path: &Path) -> Result<String, PortError> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(RemoteError::from)?;
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(PHOTO_FILE_NAME)
            .mime_str(PHOTO_MIME)
            .map_err(RemoteError::from)?;
        let form = reqwest::multipart::Form::new().part(PHOTO_FIELD, part);

        let resp = self
            .http
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(RemoteError::from)?;
        let body = read_body(resp).await?;
        let url = photo_url(&self.file_base_url, &body)?;
        tracing::debug!(path = %local_path.display(), size, %url, "photo uploaded");
        Ok(url)
    }

    async fn update_audit_session(
        &self,
        audit_id: &str,
        update: &AuditSessionUpdate,
    ) -> Result<Envelope<AuditSession>, PortError> {
        let body = self
            .post(UPSERT_AUDIT, &audit_update_body(audit_id, update))
            .await?;
        let env = parse_envelope::<AuditRow>(&body)?;
        Ok(map_items(env, |row| row.into_session("")))
    }
}
