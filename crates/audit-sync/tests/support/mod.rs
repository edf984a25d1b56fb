//! In-memory collaborators for engine tests.
//!
//! `FakeRemote` plays both the catalog and the mutation side of the record
//! store, counts every call, and fails on demand. `MemoryStore` is a
//! `DraftStore` whose writes can be switched off.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use audit_core::entities::{
    AnswerRecord, AuditDraft, AuditSession, Employee, QuestionDefinition, Section, SubAnswer,
    ViolationMap,
};
use audit_core::errors::PortError;
use audit_core::ports::{
    AnswerFields, AuditSessionUpdate, CaptureDevice, CaptureOutcome, CatalogClient, DraftStore,
    Envelope, MutationClient, Permission, ViolationPayload, ViolationRecord,
};
use audit_sync::EngineContext;

// ── Builders ───────────────────────────────────────────────────────

pub fn question(id: &str, sort_order: Option<i64>) -> QuestionDefinition {
    QuestionDefinition {
        question_id: id.into(),
        section_id: Some("sec-1".into()),
        text: format!("Is {id} compliant?"),
        sort_order,
    }
}

pub fn answer(answer_id: &str, question_id: &str) -> AnswerRecord {
    AnswerRecord {
        answer_id: answer_id.into(),
        question_id: question_id.into(),
        score: None,
        question_text_snapshot: format!("Is {question_id} compliant?"),
    }
}

pub fn sub_answer(id: &str, question_id: &str) -> SubAnswer {
    SubAnswer {
        sub_answer_id: id.into(),
        question_id: Some(question_id.into()),
        text: format!("category {id}"),
    }
}

pub fn draft() -> AuditDraft {
    AuditDraft {
        auditor_id: "u-auditor".into(),
        auditee_id: "u-auditee".into(),
        section_id: "sec-1".into(),
        start_time: Utc.with_ymd_and_hms(2026, 3, 2, 8, 30, 0).unwrap(),
    }
}

// ── Remote ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RemoteState {
    questions: Vec<QuestionDefinition>,
    answers: Vec<AnswerRecord>,
    sub_answers: HashMap<String, Vec<SubAnswer>>,
    scores: HashMap<String, Option<String>>,
    violations: Vec<ViolationPayload>,
    closed: Option<AuditSessionUpdate>,
    next_id: usize,
    employees: Vec<Employee>,
    sections: Vec<Section>,
}

#[derive(Default)]
pub struct Calls {
    pub question_fetches: AtomicUsize,
    pub answer_fetches: AtomicUsize,
    pub sub_answer_fetches: AtomicUsize,
    pub answer_creates: AtomicUsize,
    pub score_pushes: AtomicUsize,
    pub uploads: AtomicUsize,
    pub violation_creates: AtomicUsize,
    pub closes: AtomicUsize,
    pub audit_creates: AtomicUsize,
    pub directory_fetches: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Every call that reached the network.
    pub fn total(&self) -> usize {
        [
            &self.question_fetches,
            &self.answer_fetches,
            &self.sub_answer_fetches,
            &self.answer_creates,
            &self.score_pushes,
            &self.uploads,
            &self.violation_creates,
            &self.closes,
            &self.audit_creates,
            &self.directory_fetches,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[derive(Default)]
struct Failures {
    questions_not_ok: bool,
    answer_creates_after: Option<usize>,
    uploads: HashSet<PathBuf>,
    creates: HashSet<String>,
    scores: HashSet<String>,
    close: bool,
    sub_answers: bool,
    directory_not_ok: bool,
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
    failures: Mutex<Failures>,
    pub calls: Calls,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeRemote {
    pub fn new(questions: Vec<QuestionDefinition>, answers: Vec<AnswerRecord>) -> Arc<Self> {
        let remote = Self::default();
        {
            let mut state = remote.state.lock().unwrap();
            state.questions = questions;
            state.answers = answers;
        }
        Arc::new(remote)
    }

    pub fn with_sub_answers(&self, question_id: &str, options: Vec<SubAnswer>) {
        self.state
            .lock()
            .unwrap()
            .sub_answers
            .insert(question_id.into(), options);
    }

    pub fn with_directory(&self, employees: Vec<Employee>, sections: Vec<Section>) {
        let mut state = self.state.lock().unwrap();
        state.employees = employees;
        state.sections = sections;
    }

    // ── Scripted failures ──

    pub fn questions_not_ok(&self, on: bool) {
        self.failures.lock().unwrap().questions_not_ok = on;
    }

    /// Let `n` answer creates succeed, then fail the rest.
    pub fn fail_answer_creates_after(&self, n: Option<usize>) {
        self.failures.lock().unwrap().answer_creates_after = n;
    }

    pub fn fail_upload(&self, path: impl Into<PathBuf>) {
        self.failures.lock().unwrap().uploads.insert(path.into());
    }

    pub fn fail_create(&self, local_id: &str) {
        self.failures.lock().unwrap().creates.insert(local_id.into());
    }

    pub fn fail_score(&self, answer_id: &str) {
        self.failures.lock().unwrap().scores.insert(answer_id.into());
    }

    pub fn fail_close(&self, on: bool) {
        self.failures.lock().unwrap().close = on;
    }

    pub fn fail_sub_answers(&self, on: bool) {
        self.failures.lock().unwrap().sub_answers = on;
    }

    pub fn directory_not_ok(&self, on: bool) {
        self.failures.lock().unwrap().directory_not_ok = on;
    }

    pub fn heal(&self) {
        *self.failures.lock().unwrap() = Failures::default();
    }

    // ── Inspection ──

    pub fn answers(&self) -> Vec<AnswerRecord> {
        self.state.lock().unwrap().answers.clone()
    }

    pub fn remote_score(&self, answer_id: &str) -> Option<Option<String>> {
        self.state.lock().unwrap().scores.get(answer_id).cloned()
    }

    pub fn created_violations(&self) -> Vec<ViolationPayload> {
        self.state.lock().unwrap().violations.clone()
    }

    pub fn closed_with(&self) -> Option<AuditSessionUpdate> {
        self.state.lock().unwrap().closed.clone()
    }

    async fn track<T>(&self, result: T) -> T {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn unreachable(what: &str) -> PortError {
    PortError::Unreachable(format!("{what}: connection reset"))
}

#[async_trait]
impl CatalogClient for FakeRemote {
    async fn fetch_questions(
        &self,
        section_id: &str,
    ) -> Result<Envelope<QuestionDefinition>, PortError> {
        self.calls.question_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().questions_not_ok {
            return Ok(Envelope::failure());
        }
        let questions = self
            .state
            .lock()
            .unwrap()
            .questions
            .iter()
            .filter(|q| q.section_id.as_deref() == Some(section_id))
            .cloned()
            .collect();
        Ok(Envelope::success(questions))
    }

    async fn fetch_answer_records(
        &self,
        _audit_id: &str,
    ) -> Result<Envelope<AnswerRecord>, PortError> {
        self.calls.answer_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Envelope::success(self.answers()))
    }

    async fn fetch_sub_answers(
        &self,
        question_id: &str,
    ) -> Result<Envelope<SubAnswer>, PortError> {
        self.calls.sub_answer_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().sub_answers {
            return Err(PortError::Timeout);
        }
        let options = self
            .state
            .lock()
            .unwrap()
            .sub_answers
            .get(question_id)
            .cloned()
            .unwrap_or_default();
        Ok(Envelope::success(options))
    }

    async fn fetch_employees(&self) -> Result<Envelope<Employee>, PortError> {
        self.calls.directory_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().directory_not_ok {
            return Ok(Envelope::failure());
        }
        Ok(Envelope::success(self.state.lock().unwrap().employees.clone()))
    }

    async fn fetch_sections(&self) -> Result<Envelope<Section>, PortError> {
        self.calls.directory_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().directory_not_ok {
            return Ok(Envelope::failure());
        }
        Ok(Envelope::success(self.state.lock().unwrap().sections.clone()))
    }
}

#[async_trait]
impl MutationClient for FakeRemote {
    async fn create_audit(&self, draft: &AuditDraft) -> Result<Envelope<AuditSession>, PortError> {
        self.calls.audit_creates.fetch_add(1, Ordering::SeqCst);
        let mut session = AuditSession::new("audit-new", draft.section_id.clone());
        session.auditor_id = Some(draft.auditor_id.clone());
        session.auditee_id = Some(draft.auditee_id.clone());
        session.start_time = Some(draft.start_time);
        Ok(Envelope::success(vec![session]))
    }

    async fn upsert_answer(
        &self,
        answer_id: Option<&str>,
        fields: &AnswerFields,
    ) -> Result<Envelope<AnswerRecord>, PortError> {
        match (answer_id, fields) {
            (
                None,
                AnswerFields::Create {
                    question_id,
                    question_text_snapshot,
                    ..
                },
            ) => {
                let done = self.calls.answer_creates.fetch_add(1, Ordering::SeqCst);
                let limit = self.failures.lock().unwrap().answer_creates_after;
                if limit.is_some_and(|limit| done >= limit) {
                    return Err(unreachable("answer create"));
                }
                let mut state = self.state.lock().unwrap();
                state.next_id += 1;
                let record = AnswerRecord {
                    answer_id: format!("ans-new-{}", state.next_id),
                    question_id: question_id.clone(),
                    score: None,
                    question_text_snapshot: question_text_snapshot.clone(),
                };
                state.answers.push(record.clone());
                Ok(Envelope::success(vec![record]))
            }
            (Some(id), AnswerFields::Score { score }) => {
                self.calls.score_pushes.fetch_add(1, Ordering::SeqCst);
                let fail = self.failures.lock().unwrap().scores.contains(id);
                self.track(()).await;
                if fail {
                    return Err(unreachable("score update"));
                }
                let mut state = self.state.lock().unwrap();
                state.scores.insert(id.to_string(), score.clone());
                let record = state.answers.iter().find(|a| a.answer_id == id).cloned();
                Ok(Envelope::success(record.into_iter().collect()))
            }
            _ => Err(PortError::Rejected("unexpected upsert shape".into())),
        }
    }

    async fn create_violation(
        &self,
        payload: &ViolationPayload,
    ) -> Result<Envelope<ViolationRecord>, PortError> {
        self.calls.violation_creates.fetch_add(1, Ordering::SeqCst);
        let fail = self.failures.lock().unwrap().creates.contains(&payload.client_ref);
        self.track(()).await;
        if fail {
            return Ok(Envelope::failure());
        }
        let mut state = self.state.lock().unwrap();
        state.violations.push(payload.clone());
        Ok(Envelope::success(vec![ViolationRecord {
            violation_id: format!("v-{}", state.violations.len()),
        }]))
    }

    async fn upload_photo(&self, local_path: &Path) -> Result<String, PortError> {
        self.calls.uploads.fetch_add(1, Ordering::SeqCst);
        let fail = self.failures.lock().unwrap().uploads.contains(local_path);
        self.track(()).await;
        if fail {
            return Err(PortError::Timeout);
        }
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("https://files.example.test/{name}"))
    }

    async fn update_audit_session(
        &self,
        audit_id: &str,
        update: &AuditSessionUpdate,
    ) -> Result<Envelope<AuditSession>, PortError> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().unwrap().close {
            return Err(unreachable("audit close"));
        }
        self.state.lock().unwrap().closed = Some(update.clone());
        let mut session = AuditSession::new(audit_id, "sec-1");
        session.end_time = update.end_time;
        Ok(Envelope::success(vec![session]))
    }
}

// ── Capture ────────────────────────────────────────────────────────

pub struct FakeCapture {
    permission: Permission,
    cancel: AtomicBool,
    shots: AtomicUsize,
}

impl FakeCapture {
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            permission: Permission::Granted,
            cancel: AtomicBool::new(false),
            shots: AtomicUsize::new(0),
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            permission: Permission::Denied,
            cancel: AtomicBool::new(false),
            shots: AtomicUsize::new(0),
        })
    }

    pub fn cancel_next(&self, on: bool) {
        self.cancel.store(on, Ordering::SeqCst);
    }

    /// Path the n-th capture (1-based) writes to.
    pub fn shot_path(n: usize) -> PathBuf {
        PathBuf::from(format!("/photos/shot-{n}.jpg"))
    }
}

#[async_trait]
impl CaptureDevice for FakeCapture {
    async fn request_permission(&self) -> Result<Permission, PortError> {
        Ok(self.permission)
    }

    async fn capture(&self) -> Result<CaptureOutcome, PortError> {
        if self.cancel.load(Ordering::SeqCst) {
            return Ok(CaptureOutcome::Cancelled);
        }
        let n = self.shots.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CaptureOutcome::Captured(Self::shot_path(n)))
    }
}

// ── Draft store ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    violations: Mutex<HashMap<String, ViolationMap>>,
    answers: Mutex<HashMap<String, Vec<AnswerRecord>>>,
    sessions: Mutex<HashMap<String, AuditSession>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn stored_violations(&self, audit_id: &str) -> ViolationMap {
        self.violations
            .lock()
            .unwrap()
            .get(audit_id)
            .cloned()
            .unwrap_or_default()
    }

    fn write(&self) -> Result<(), PortError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PortError::Io("disk full".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&self) -> Result<(), PortError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Io("database is locked".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn save_violations(&self, audit_id: &str, map: &ViolationMap) -> Result<(), PortError> {
        self.write()?;
        self.violations
            .lock()
            .unwrap()
            .insert(audit_id.into(), map.clone());
        Ok(())
    }

    async fn load_violations(&self, audit_id: &str) -> Result<ViolationMap, PortError> {
        self.read()?;
        Ok(self.stored_violations(audit_id))
    }

    async fn save_answers(
        &self,
        audit_id: &str,
        answers: &[AnswerRecord],
    ) -> Result<(), PortError> {
        self.write()?;
        self.answers
            .lock()
            .unwrap()
            .insert(audit_id.into(), answers.to_vec());
        Ok(())
    }

    async fn load_answers(&self, audit_id: &str) -> Result<Vec<AnswerRecord>, PortError> {
        self.read()?;
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(audit_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_session(&self, session: &AuditSession) -> Result<(), PortError> {
        self.write()?;
        self.sessions
            .lock()
            .unwrap()
            .insert(session.audit_id.clone(), session.clone());
        Ok(())
    }

    async fn load_session(&self, audit_id: &str) -> Result<Option<AuditSession>, PortError> {
        self.read()?;
        Ok(self.sessions.lock().unwrap().get(audit_id).cloned())
    }
}

// ── Wiring ─────────────────────────────────────────────────────────

pub fn context(
    remote: &Arc<FakeRemote>,
    capture: &Arc<FakeCapture>,
    store: Arc<dyn DraftStore>,
) -> EngineContext {
    EngineContext::new(
        Arc::clone(remote) as Arc<dyn CatalogClient>,
        Arc::clone(remote) as Arc<dyn MutationClient>,
        Arc::clone(capture) as Arc<dyn CaptureDevice>,
        store,
    )
}

/// Section `sec-1` with three questions; the audit already answered the
/// second one.
pub fn three_question_remote() -> Arc<FakeRemote> {
    FakeRemote::new(
        vec![
            question("q-1", Some(10)),
            question("q-2", Some(20)),
            question("q-3", Some(30)),
        ],
        vec![answer("ans-2", "q-2")],
    )
}
