//! Session engine: the one object a front end drives for an open audit.
//!
//! The engine holds the reconciled answer list, the violation queue and the
//! submission state of a single audit. Collaborators come in through an
//! explicit [`EngineContext`]; nothing here is global.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use audit_core::entities::{
    AnswerRecord, AuditDraft, AuditSession, Employee, Section, SubAnswer, ViolationEdit,
    ViolationEntry, ViolationMap,
};
use audit_core::enums::SessionState;
use audit_core::ports::{
    AnswerFields, AuditSessionUpdate, CaptureDevice, CatalogClient, DraftStore, MutationClient,
};
use audit_core::responses::{FinalizeOutcome, FinalizeReport};
use audit_core::time::server_now;

use crate::error::SyncError;
use crate::queue::ViolationQueue;
use crate::reconcile::reconcile;
use crate::submit::SubmissionCoordinator;

/// Default fan-out for finalize.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

// ── Context ────────────────────────────────────────────────────────

/// Collaborators and tuning shared by every engine instance.
#[derive(Clone)]
pub struct EngineContext {
    pub catalog: Arc<dyn CatalogClient>,
    pub mutations: Arc<dyn MutationClient>,
    pub capture: Arc<dyn CaptureDevice>,
    pub store: Arc<dyn DraftStore>,
    /// Maximum concurrent remote calls during finalize (at least 1).
    pub max_parallel: usize,
}

impl EngineContext {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        mutations: Arc<dyn MutationClient>,
        capture: Arc<dyn CaptureDevice>,
        store: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            catalog,
            mutations,
            capture,
            store,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }

    #[must_use]
    pub const fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }
}

// ── Audit creation ─────────────────────────────────────────────────

/// Create a new audit remotely and store its header locally.
///
/// # Errors
///
/// Returns [`SyncError::RemoteCreate`] if the store rejects the audit or
/// answers without one. A failed local save is only logged.
pub async fn create_audit(ctx: &EngineContext, draft: &AuditDraft) -> Result<AuditSession, SyncError> {
    let remote_create = |source| SyncError::RemoteCreate {
        unit: "audit".into(),
        source,
    };
    let session = ctx
        .mutations
        .create_audit(draft)
        .await
        .and_then(|env| env.into_items("audit create"))
        .map_err(remote_create)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            remote_create(audit_core::errors::PortError::Malformed(
                "audit create returned no record".into(),
            ))
        })?;

    if let Err(e) = ctx.store.save_session(&session).await {
        tracing::warn!(audit_id = %session.audit_id, error = %e, "failed to store new audit header");
    }
    tracing::info!(audit_id = %session.audit_id, section_id = %session.section_id, "audit created");
    Ok(session)
}

/// People who can be named auditor or auditee, sorted by display name.
///
/// # Errors
///
/// Returns [`SyncError::CatalogFetch`] if the directory cannot be read.
pub async fn list_employees(ctx: &EngineContext) -> Result<Vec<Employee>, SyncError> {
    let mut employees = ctx
        .catalog
        .fetch_employees()
        .await
        .and_then(|env| env.into_items("employee directory"))
        .map_err(SyncError::CatalogFetch)?;
    employees.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(employees)
}

/// Sections an audit can cover, in store order.
///
/// # Errors
///
/// Returns [`SyncError::CatalogFetch`] if the section list cannot be read.
pub async fn list_sections(ctx: &EngineContext) -> Result<Vec<Section>, SyncError> {
    ctx.catalog
        .fetch_sections()
        .await
        .and_then(|env| env.into_items("section list"))
        .map_err(SyncError::CatalogFetch)
}

// ── Engine ─────────────────────────────────────────────────────────

pub struct AuditSessionEngine {
    ctx: EngineContext,
    session: AuditSession,
    state: SessionState,
    answers: Vec<AnswerRecord>,
    queue: Arc<Mutex<ViolationQueue>>,
    /// Sub-answer options by question id. Only successful fetches are cached.
    sub_answers: HashMap<String, Vec<SubAnswer>>,
    /// Local store writes that failed outside the queue.
    persistence_failures: usize,
}

impl AuditSessionEngine {
    /// Open an audit: reconcile its answers against the catalog, then load
    /// the stored drafts.
    ///
    /// Scores stored locally win over remote ones for the same answer, since
    /// they may not have been pushed yet.
    ///
    /// # Errors
    ///
    /// - [`SyncError::CatalogFetch`] or [`SyncError::RemoteCreate`] from
    ///   reconciliation.
    /// - [`SyncError::Persistence`] if stored drafts cannot be read.
    pub async fn open(ctx: EngineContext, session: AuditSession) -> Result<Self, SyncError> {
        let audit_id = session.audit_id.clone();
        let stored_session = ctx
            .store
            .load_session(&audit_id)
            .await
            .map_err(SyncError::Persistence)?;
        let stored_answers = ctx
            .store
            .load_answers(&audit_id)
            .await
            .map_err(SyncError::Persistence)?;

        let reconciled = reconcile(
            ctx.catalog.as_ref(),
            ctx.mutations.as_ref(),
            &audit_id,
            &session.section_id,
        )
        .await?;

        let local_scores: HashMap<String, Option<String>> = stored_answers
            .into_iter()
            .map(|a| (a.answer_id, a.score))
            .collect();
        let answers = reconciled
            .answers
            .into_iter()
            .map(|mut answer| {
                if let Some(score) = local_scores.get(&answer.answer_id) {
                    answer.score.clone_from(score);
                }
                answer
            })
            .collect();

        let session = merge_header(session, stored_session);
        let queue = ViolationQueue::load(&audit_id, Arc::clone(&ctx.store)).await?;

        let mut engine = Self::assemble(ctx, session, answers, queue);
        engine.persist_session().await;
        engine.persist_answers().await;
        Ok(engine)
    }

    /// Rebuild an engine from the local store alone, without any network call.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotFound`] if the audit was never opened on this device.
    /// - [`SyncError::Persistence`] if the store cannot be read.
    pub async fn resume(ctx: EngineContext, audit_id: &str) -> Result<Self, SyncError> {
        let session = ctx
            .store
            .load_session(audit_id)
            .await
            .map_err(SyncError::Persistence)?
            .ok_or_else(|| SyncError::not_found("audit", audit_id))?;
        let answers = ctx
            .store
            .load_answers(audit_id)
            .await
            .map_err(SyncError::Persistence)?;
        let queue = ViolationQueue::load(audit_id, Arc::clone(&ctx.store)).await?;
        tracing::debug!(audit_id, answers = answers.len(), "session resumed offline");
        Ok(Self::assemble(ctx, session, answers, queue))
    }

    fn assemble(
        ctx: EngineContext,
        session: AuditSession,
        answers: Vec<AnswerRecord>,
        queue: ViolationQueue,
    ) -> Self {
        let state = if session.is_closed() {
            SessionState::Finalized
        } else {
            SessionState::Editing
        };
        Self {
            ctx,
            session,
            state,
            answers,
            queue: Arc::new(Mutex::new(queue)),
            sub_answers: HashMap::new(),
            persistence_failures: 0,
        }
    }

    // ── Reads ──────────────────────────────────────────────────────

    #[must_use]
    pub const fn session(&self) -> &AuditSession {
        &self.session
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Answer records in display order.
    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Snapshot of the violation map.
    pub async fn violations(&self) -> ViolationMap {
        self.queue.lock().await.entries().clone()
    }

    /// Snapshot of one violation entry.
    pub async fn violation(&self, local_id: &str) -> Option<ViolationEntry> {
        self.queue.lock().await.get(local_id).cloned()
    }

    // ── Edits ──────────────────────────────────────────────────────

    /// Set (or clear with `None`) the score of an answer.
    ///
    /// The score is stored locally, then pushed immediately on a best-effort
    /// basis. Returns whether that push succeeded; finalize pushes it again
    /// either way.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidTransition`] once the session is finalized.
    /// - [`SyncError::NotFound`] for an unknown answer.
    pub async fn set_score(
        &mut self,
        answer_id: &str,
        score: Option<String>,
    ) -> Result<bool, SyncError> {
        self.ensure_editable("set score")?;
        let answer = self
            .answers
            .iter_mut()
            .find(|a| a.answer_id == answer_id)
            .ok_or_else(|| SyncError::not_found("answer", answer_id))?;
        answer.score.clone_from(&score);
        self.persist_answers().await;

        let pushed = self
            .ctx
            .mutations
            .upsert_answer(Some(answer_id), &AnswerFields::Score { score })
            .await
            .and_then(|env| env.into_items("score update"));
        match pushed {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(answer_id, error = %e, "score push deferred to finalize");
                Ok(false)
            }
        }
    }

    /// Capture a violation photo for an answer. `Ok(None)` means the user
    /// cancelled.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidTransition`] once the session is finalized.
    /// - [`SyncError::NotFound`] for an unknown answer.
    /// - [`SyncError::CaptureDenied`] or [`SyncError::Capture`] from the device.
    pub async fn add_violation(
        &mut self,
        answer_id: &str,
    ) -> Result<Option<ViolationEntry>, SyncError> {
        self.ensure_editable("add violation")?;
        self.answer(answer_id)?;
        self.queue
            .lock()
            .await
            .capture(self.ctx.capture.as_ref(), answer_id)
            .await
    }

    /// Edit the note, resolved flag or classification of a violation.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidTransition`] once the session is finalized.
    /// - [`SyncError::NotFound`] for an unknown violation, or a sub-answer
    ///   that is not among the options loaded for the entry's question.
    pub async fn edit_violation(
        &mut self,
        local_id: &str,
        edit: ViolationEdit,
    ) -> Result<ViolationEntry, SyncError> {
        self.ensure_editable("edit violation")?;
        let mut queue = self.queue.lock().await;
        if let ViolationEdit::SubAnswer(Some(sub_answer_id)) = &edit {
            let answer_id = queue
                .get(local_id)
                .map(|entry| entry.answer_id.clone())
                .ok_or_else(|| SyncError::not_found("violation", local_id))?;
            self.check_sub_answer(&answer_id, sub_answer_id)?;
        }
        queue.update(local_id, edit).await
    }

    /// Remove a violation that has not been created remotely.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidTransition`] once the session is finalized.
    /// - [`SyncError::NotFound`] for an unknown violation.
    /// - [`SyncError::InvariantViolation`] if it already exists remotely.
    pub async fn remove_violation(&mut self, local_id: &str) -> Result<ViolationEntry, SyncError> {
        self.ensure_editable("remove violation")?;
        self.queue.lock().await.delete(local_id).await
    }

    /// Classification options for violations under an answer's question.
    ///
    /// A failed fetch yields an empty list and is retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] for an unknown answer.
    pub async fn sub_answer_options(&mut self, answer_id: &str) -> Result<Vec<SubAnswer>, SyncError> {
        let question_id = self.answer(answer_id)?.question_id.clone();
        if let Some(options) = self.sub_answers.get(&question_id) {
            return Ok(options.clone());
        }

        match self
            .ctx
            .catalog
            .fetch_sub_answers(&question_id)
            .await
            .and_then(|env| env.into_items("sub-answers"))
        {
            Ok(options) => {
                self.sub_answers.insert(question_id, options.clone());
                Ok(options)
            }
            Err(e) => {
                tracing::warn!(%question_id, error = %e, "sub-answer options unavailable");
                Ok(Vec::new())
            }
        }
    }

    // ── Finalize ───────────────────────────────────────────────────

    /// Push all pending work and close the audit if everything landed.
    ///
    /// Safe to call again after a partial outcome: entries that were already
    /// uploaded or created are not sent twice. On a finalized session it
    /// returns the stored success without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidTransition`] only if the state machine
    /// refuses to enter submission.
    pub async fn finalize_session(&mut self) -> Result<FinalizeOutcome, SyncError> {
        if let (SessionState::Finalized, Some(end_time)) = (self.state, self.session.end_time) {
            let already = self.queue.lock().await.len();
            return Ok(FinalizeOutcome::Success {
                end_time,
                report: FinalizeReport {
                    violations_already_synced: already,
                    ..FinalizeReport::default()
                },
            });
        }
        self.recover_cancelled_submit();
        self.transition("finalize", SessionState::Submitting)?;

        let audit_id = self.session.audit_id.clone();
        let failures_before = self.total_persistence_failures().await;
        tracing::info!(%audit_id, answers = self.answers.len(), "finalize started");

        let coordinator = SubmissionCoordinator::new(
            Arc::clone(&self.ctx.mutations),
            Arc::clone(&self.queue),
            self.ctx.max_parallel,
        );
        let (scores_pushed, score_failures) = coordinator.push_scores(&self.answers).await;
        let violations = coordinator.sync_violations().await;

        let mut report = FinalizeReport {
            scores_pushed,
            score_failures,
            violations_synced: violations.synced,
            violations_already_synced: violations.already_synced,
            violation_failures: violations.failures,
            ..FinalizeReport::default()
        };

        if !report.all_pending_work_done() {
            report.persistence_warnings = self.total_persistence_failures().await - failures_before;
            self.transition("finalize", SessionState::Editing)?;
            tracing::warn!(
                %audit_id,
                failed_scores = report.score_failures.len(),
                failed_violations = report.violation_failures.len(),
                "finalize incomplete; audit left open"
            );
            return Ok(FinalizeOutcome::Partial { report });
        }

        let end_time = server_now();
        let closed = self
            .ctx
            .mutations
            .update_audit_session(
                &audit_id,
                &AuditSessionUpdate {
                    end_time: Some(end_time),
                },
            )
            .await
            .and_then(|env| env.into_items("audit close"));
        if let Err(e) = closed {
            tracing::warn!(%audit_id, error = %e, "closing the audit failed");
            report.close_error = Some(e.to_string());
            report.persistence_warnings = self.total_persistence_failures().await - failures_before;
            self.transition("finalize", SessionState::Editing)?;
            return Ok(FinalizeOutcome::Partial { report });
        }

        self.session.end_time = Some(end_time);
        self.transition("finalize", SessionState::Finalized)?;
        self.persist_session().await;
        report.persistence_warnings = self.total_persistence_failures().await - failures_before;
        tracing::info!(
            %audit_id,
            scores = report.scores_pushed,
            violations = report.violations_synced,
            "audit finalized"
        );
        Ok(FinalizeOutcome::Success { end_time, report })
    }

    // ── Internals ──────────────────────────────────────────────────

    fn answer(&self, answer_id: &str) -> Result<&AnswerRecord, SyncError> {
        self.answers
            .iter()
            .find(|a| a.answer_id == answer_id)
            .ok_or_else(|| SyncError::not_found("answer", answer_id))
    }

    fn check_sub_answer(&self, answer_id: &str, sub_answer_id: &str) -> Result<(), SyncError> {
        let question_id = &self.answer(answer_id)?.question_id;
        match self.sub_answers.get(question_id) {
            Some(options) if !options.iter().any(|o| o.sub_answer_id == sub_answer_id) => {
                Err(SyncError::not_found("sub_answer", sub_answer_id))
            }
            _ => Ok(()),
        }
    }

    /// A `Submitting` state seen outside `finalize_session` means a previous
    /// finalize future was dropped. Its committed flags stand; go back to
    /// editing.
    fn recover_cancelled_submit(&mut self) {
        if self.state == SessionState::Submitting {
            tracing::debug!(audit_id = %self.session.audit_id, "recovering from cancelled finalize");
            self.state = SessionState::Editing;
        }
    }

    fn ensure_editable(&mut self, operation: &'static str) -> Result<(), SyncError> {
        self.recover_cancelled_submit();
        if self.state.accepts_edits() {
            Ok(())
        } else {
            Err(SyncError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, operation: &'static str, next: SessionState) -> Result<(), SyncError> {
        if !self.state.can_transition_to(next) {
            return Err(SyncError::InvalidTransition {
                operation,
                state: self.state,
            });
        }
        tracing::debug!(audit_id = %self.session.audit_id, from = %self.state, to = %next, "session state");
        self.state = next;
        Ok(())
    }

    async fn total_persistence_failures(&self) -> usize {
        self.persistence_failures + self.queue.lock().await.persistence_failures()
    }

    async fn persist_session(&mut self) {
        if let Err(e) = self.ctx.store.save_session(&self.session).await {
            self.persistence_failures += 1;
            tracing::warn!(audit_id = %self.session.audit_id, error = %e, "failed to persist session header");
        }
    }

    async fn persist_answers(&mut self) {
        if let Err(e) = self
            .ctx
            .store
            .save_answers(&self.session.audit_id, &self.answers)
            .await
        {
            self.persistence_failures += 1;
            tracing::warn!(audit_id = %self.session.audit_id, error = %e, "failed to persist answers");
        }
    }
}

/// Fill gaps in the caller's header from the stored one. A stored end time
/// always wins: a finalized audit stays finalized.
fn merge_header(session: AuditSession, stored: Option<AuditSession>) -> AuditSession {
    let Some(stored) = stored else {
        return session;
    };
    AuditSession {
        auditor_id: session.auditor_id.or(stored.auditor_id),
        auditee_id: session.auditee_id.or(stored.auditee_id),
        start_time: stored.start_time.or(session.start_time),
        end_time: stored.end_time.or(session.end_time),
        ..session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn stored_end_time_survives_merge() {
        let mut stored = AuditSession::new("a-1", "sec-1");
        stored.end_time = Some(Utc::now());
        stored.auditor_id = Some("u-1".into());

        let merged = merge_header(AuditSession::new("a-1", "sec-1"), Some(stored.clone()));
        assert_eq!(merged.end_time, stored.end_time);
        assert_eq!(merged.auditor_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn caller_fields_win_over_stored_identities() {
        let mut stored = AuditSession::new("a-1", "sec-1");
        stored.auditee_id = Some("u-old".into());
        let mut given = AuditSession::new("a-1", "sec-1");
        given.auditee_id = Some("u-new".into());

        let merged = merge_header(given, Some(stored));
        assert_eq!(merged.auditee_id.as_deref(), Some("u-new"));
        assert!(merged.end_time.is_none());
    }
}
