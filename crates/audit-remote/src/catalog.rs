//! Catalog reads: questions of a section, answers of an audit, sub-answers
//! of a question, and the employee and section directories.

use async_trait::async_trait;

use audit_core::entities::{AnswerRecord, Employee, QuestionDefinition, Section, SubAnswer};
use audit_core::errors::PortError;
use audit_core::ports::{CatalogClient, Envelope};

use crate::envelope::{map_items, parse_envelope};
use crate::error::RemoteError;
use crate::http::read_body;
use crate::retry::with_retry;
use crate::wire::{AnswerRow, EmployeeRow, QuestionRow, SectionRow, SubAnswerRow};
use crate::{
    ALL_EMPLOYEES, ANSWERS_BY_AUDIT, EMPLOYEE_PAGE_SIZE, QUESTIONS_BY_SECTION, RecordStoreClient,
    SECTION_NAMES, SUB_ANSWERS_BY_QUESTION,
};

impl RecordStoreClient {
    async fn get_body(&self, url: &str) -> Result<String, RemoteError> {
        read_body(self.http.get(url).send().await?).await
    }

    /// GET `path` with retries, returning the raw body.
    async fn read(&self, path: &str, params: &[(&str, &str)]) -> Result<String, RemoteError> {
        let url = self.endpoint(path, params);
        let url = url.as_str();
        with_retry(&self.retry, path, move || self.get_body(url)).await
    }
}

#[async_trait]
impl CatalogClient for RecordStoreClient {
    async fn fetch_questions(
        &self,
        section_id: &str,
    ) -> Result<Envelope<QuestionDefinition>, PortError> {
        let body = self
            .read(QUESTIONS_BY_SECTION, &[("sectionparam", section_id)])
            .await?;
        let env = parse_envelope::<QuestionRow>(&body)?;
        tracing::debug!(section_id, ok = env.ok, count = env.items.len(), "questions fetched");
        Ok(map_items(env, Into::into))
    }

    async fn fetch_answer_records(
        &self,
        audit_id: &str,
    ) -> Result<Envelope<AnswerRecord>, PortError> {
        let body = self.read(ANSWERS_BY_AUDIT, &[("auditid", audit_id)]).await?;
        let env = parse_envelope::<AnswerRow>(&body)?;
        tracing::debug!(audit_id, ok = env.ok, count = env.items.len(), "answers fetched");
        Ok(map_items(env, Into::into))
    }

    async fn fetch_sub_answers(
        &self,
        question_id: &str,
    ) -> Result<Envelope<SubAnswer>, PortError> {
        let body = self
            .read(SUB_ANSWERS_BY_QUESTION, &[("ParamQuestion", question_id)])
            .await?;
        let env = parse_envelope::<SubAnswerRow>(&body)?;
        Ok(map_items(env, Into::into))
    }

    async fn fetch_employees(&self) -> Result<Envelope<Employee>, PortError> {
        let body = self.read(ALL_EMPLOYEES, &[("pageSize", EMPLOYEE_PAGE_SIZE)]).await?;
        let env = parse_envelope::<EmployeeRow>(&body)?;
        tracing::debug!(ok = env.ok, count = env.items.len(), "employees fetched");
        Ok(map_items(env, Into::into))
    }

    async fn fetch_sections(&self) -> Result<Envelope<Section>, PortError> {
        let body = self.read(SECTION_NAMES, &[]).await?;
        let env = parse_envelope::<SectionRow>(&body)?;
        tracing::debug!(ok = env.ok, count = env.items.len(), "sections fetched");
        Ok(map_items(env, Into::into))
    }
}
