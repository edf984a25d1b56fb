//! # audit-remote
//!
//! HTTP client for the hosted record store that holds audits, answers,
//! violations and the question catalog.
//!
//! Every request carries the application id, the auditor's session id and
//! (when configured) the network id as query parameters. Responses are
//! normalized into [`audit_core::ports::Envelope`] before they leave this
//! crate, and errors are mapped onto [`audit_core::errors::PortError`].
//!
//! - `catalog`: question, answer, sub-answer, employee and section reads
//!   (retried on transient failures)
//! - `mutation`: audit, answer and violation writes plus photo upload (never
//!   retried automatically)

mod catalog;
mod envelope;
mod error;
mod http;
mod mutation;
pub mod retry;
mod wire;

pub use error::RemoteError;
pub use retry::RetryConfig;

use std::time::Duration;

use audit_config::RemoteConfig;

// ── Endpoints ──────────────────────────────────────────────────────

pub(crate) const QUESTIONS_BY_SECTION: &str = "questions/FindQuestionParam";
pub(crate) const ANSWERS_BY_AUDIT: &str = "audit_questions/FindAQID";
pub(crate) const UPSERT_ANSWER: &str = "audit_questions/CreateAQ";
pub(crate) const UPSERT_AUDIT: &str = "audit5s/CreateAudits";
pub(crate) const CREATE_VIOLATION: &str = "violations/CreateViolation";
pub(crate) const SUB_ANSWERS_BY_QUESTION: &str = "sub_answer/GetFindSubAnswers";
pub(crate) const ALL_EMPLOYEES: &str = "employees/GetAllEmployees";
pub(crate) const SECTION_NAMES: &str = "sections/GetSectionsName";

/// Page size for the employee directory; one page covers a site.
pub(crate) const EMPLOYEE_PAGE_SIZE: &str = "200";

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the record store.
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: String,
    upload_url: String,
    file_base_url: String,
    app_id: String,
    network_id: String,
    session_id: String,
    retry: RetryConfig,
}

impl RecordStoreClient {
    /// Build a client from the remote configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the underlying `reqwest::Client`
    /// fails to build (for example, no TLS backend).
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fieldaudit/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_url: config.upload_url.clone(),
            file_base_url: config.file_base_url.clone(),
            app_id: config.app_id.clone(),
            network_id: config.network_id.clone(),
            session_id: config.session_id.clone(),
            retry: RetryConfig::default(),
        })
    }

    /// Replace the retry policy used for catalog reads.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL for `path` with the session parameters and `params` appended.
    pub(crate) fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{}/{path}?appID={}&sessionID={}",
            self.base_url,
            urlencoding::encode(&self.app_id),
            urlencoding::encode(&self.session_id),
        );
        if !self.network_id.is_empty() {
            url.push_str("&networkId=");
            url.push_str(&urlencoding::encode(&self.network_id));
        }
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(network_id: &str) -> RecordStoreClient {
        RecordStoreClient::new(&RemoteConfig {
            base_url: "https://records.example/api/v5/data/".into(),
            upload_url: "https://records.example/api/upload".into(),
            app_id: "app-1".into(),
            network_id: network_id.into(),
            session_id: "s 1".into(),
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_carries_session_params() {
        let url = client("344").endpoint(QUESTIONS_BY_SECTION, &[("sectionparam", "sec/7")]);
        assert_eq!(
            url,
            "https://records.example/api/v5/data/questions/FindQuestionParam\
             ?appID=app-1&sessionID=s%201&networkId=344&sectionparam=sec%2F7"
        );
    }

    #[test]
    fn endpoint_omits_empty_network_id() {
        let url = client("").endpoint(ANSWERS_BY_AUDIT, &[("auditid", "a-1")]);
        assert!(!url.contains("networkId"), "{url}");
        assert!(url.ends_with("&auditid=a-1"), "{url}");
    }
}
