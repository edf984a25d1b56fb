//! Opening, resuming and editing a session outside of finalize.

mod support;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use audit_core::entities::{AuditSession, Employee, Section, ViolationEdit};
use audit_core::enums::SessionState;
use audit_core::ports::DraftStore;
use audit_store::AuditStore;
use audit_sync::{AuditSessionEngine, SyncError, create_audit, list_employees, list_sections};
use support::{
    Calls, FakeCapture, FakeRemote, MemoryStore, context, draft, sub_answer, three_question_remote,
};

fn answer_ids(engine: &AuditSessionEngine) -> Vec<&str> {
    engine.answers().iter().map(|a| a.answer_id.as_str()).collect()
}

#[tokio::test]
async fn open_reconciles_and_stores_the_answer_list() {
    let remote = three_question_remote();
    let store = MemoryStore::new();
    let ctx = context(&remote, &FakeCapture::granted(), Arc::clone(&store) as Arc<dyn DraftStore>);

    let engine = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();

    assert_eq!(answer_ids(&engine), vec!["ans-new-1", "ans-2", "ans-new-2"]);
    assert_eq!(engine.state(), SessionState::Editing);
    assert_eq!(store.load_answers("audit-1").await.unwrap().len(), 3);
    assert!(store.load_session("audit-1").await.unwrap().is_some());
}

#[tokio::test]
async fn unpushed_local_scores_survive_reopen() {
    let remote = three_question_remote();
    let store = MemoryStore::new();
    let camera = FakeCapture::granted();
    let ctx = context(&remote, &camera, Arc::clone(&store) as Arc<dyn DraftStore>);

    let mut engine = AuditSessionEngine::open(ctx.clone(), AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();
    remote.fail_score("ans-2");
    let pushed = engine.set_score("ans-2", Some("2".into())).await.unwrap();
    assert!(!pushed);
    drop(engine);

    let reopened = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();

    let score = reopened
        .answers()
        .iter()
        .find(|a| a.answer_id == "ans-2")
        .and_then(|a| a.score.clone());
    assert_eq!(score.as_deref(), Some("2"));
    assert_eq!(Calls::get(&remote.calls.answer_creates), 2);
}

#[tokio::test]
async fn catalog_failure_fails_open() {
    let remote = three_question_remote();
    remote.questions_not_ok(true);
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());

    let err = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, SyncError::CatalogFetch(_)));
    assert_eq!(Calls::get(&remote.calls.answer_creates), 0);
}

#[tokio::test]
async fn resume_needs_no_network() {
    let remote = three_question_remote();
    let store = MemoryStore::new();
    let camera = FakeCapture::granted();
    let ctx = context(&remote, &camera, Arc::clone(&store) as Arc<dyn DraftStore>);
    let mut engine = AuditSessionEngine::open(ctx.clone(), AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();
    engine.add_violation("ans-new-1").await.unwrap().unwrap();
    let calls_before = remote.calls.total();
    drop(engine);

    let resumed = AuditSessionEngine::resume(ctx, "audit-1").await.unwrap();

    assert_eq!(remote.calls.total(), calls_before);
    assert_eq!(answer_ids(&resumed), vec!["ans-new-1", "ans-2", "ans-new-2"]);
    assert_eq!(resumed.violations().await["ans-new-1"].len(), 1);
}

#[tokio::test]
async fn resume_of_unknown_audit_is_not_found() {
    let remote = FakeRemote::new(vec![], vec![]);
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());

    let err = AuditSessionEngine::resume(ctx, "audit-404").await.err().unwrap();

    assert!(matches!(err, SyncError::NotFound { .. }));
}

#[tokio::test]
async fn violations_need_a_known_answer() {
    let remote = three_question_remote();
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());
    let mut engine = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();

    let err = engine.add_violation("ans-unknown").await.unwrap_err();

    assert!(matches!(err, SyncError::NotFound { ref entity_type, .. } if entity_type == "answer"));
    assert!(engine.violations().await.is_empty());
}

#[tokio::test]
async fn sub_answer_edits_are_checked_against_loaded_options() {
    let remote = three_question_remote();
    remote.with_sub_answers("q-2", vec![sub_answer("sub-1", "q-2"), sub_answer("sub-2", "q-2")]);
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());
    let mut engine = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();
    let entry = engine.add_violation("ans-2").await.unwrap().unwrap();

    let options = engine.sub_answer_options("ans-2").await.unwrap();
    assert_eq!(options.len(), 2);
    engine.sub_answer_options("ans-2").await.unwrap();
    assert_eq!(Calls::get(&remote.calls.sub_answer_fetches), 1);

    let updated = engine
        .edit_violation(&entry.local_id, ViolationEdit::SubAnswer(Some("sub-2".into())))
        .await
        .unwrap();
    assert_eq!(updated.sub_answer_id.as_deref(), Some("sub-2"));

    let err = engine
        .edit_violation(&entry.local_id, ViolationEdit::SubAnswer(Some("sub-9".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { ref entity_type, .. } if entity_type == "sub_answer"));

    let cleared = engine
        .edit_violation(&entry.local_id, ViolationEdit::SubAnswer(None))
        .await
        .unwrap();
    assert!(cleared.sub_answer_id.is_none());
}

#[tokio::test]
async fn failed_option_fetch_is_empty_and_not_cached() {
    let remote = three_question_remote();
    remote.with_sub_answers("q-1", vec![sub_answer("sub-1", "q-1")]);
    remote.fail_sub_answers(true);
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());
    let mut engine = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
        .await
        .unwrap();

    assert!(engine.sub_answer_options("ans-new-1").await.unwrap().is_empty());

    remote.heal();
    assert_eq!(engine.sub_answer_options("ans-new-1").await.unwrap().len(), 1);
    assert_eq!(Calls::get(&remote.calls.sub_answer_fetches), 2);
}

#[tokio::test]
async fn create_audit_stores_the_new_header() {
    let remote = FakeRemote::new(vec![], vec![]);
    let store = MemoryStore::new();
    let ctx = context(&remote, &FakeCapture::granted(), Arc::clone(&store) as Arc<dyn DraftStore>);

    let session = create_audit(&ctx, &draft()).await.unwrap();

    assert_eq!(session.audit_id, "audit-new");
    assert_eq!(session.auditor_id.as_deref(), Some("u-auditor"));
    assert_eq!(store.load_session("audit-new").await.unwrap(), Some(session));
}

fn employee(id: &str, name: &str) -> Employee {
    Employee {
        employee_id: id.into(),
        display_name: name.into(),
    }
}

#[tokio::test]
async fn directory_lists_people_by_name_and_sections_in_store_order() {
    let remote = FakeRemote::new(vec![], vec![]);
    remote.with_directory(
        vec![employee("u-2", "Petrov Oleg"), employee("u-1", "Ivanova Anna")],
        vec![
            Section {
                section_id: "sec-2".into(),
                name: "Warehouse".into(),
            },
            Section {
                section_id: "sec-1".into(),
                name: "Office".into(),
            },
        ],
    );
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());

    let employees = list_employees(&ctx).await.unwrap();
    let sections = list_sections(&ctx).await.unwrap();

    let ids: Vec<&str> = employees.iter().map(|e| e.employee_id.as_str()).collect();
    assert_eq!(ids, vec!["u-1", "u-2"]);
    assert_eq!(sections[0].section_id, "sec-2");
    assert_eq!(Calls::get(&remote.calls.directory_fetches), 2);
}

#[tokio::test]
async fn directory_failure_is_a_catalog_error() {
    let remote = FakeRemote::new(vec![], vec![]);
    remote.directory_not_ok(true);
    let ctx = context(&remote, &FakeCapture::granted(), MemoryStore::new());

    assert!(matches!(list_employees(&ctx).await, Err(SyncError::CatalogFetch(_))));
    assert!(matches!(list_sections(&ctx).await, Err(SyncError::CatalogFetch(_))));
}

#[tokio::test]
async fn restart_mid_finalize_does_not_upload_twice() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("drafts.db");
    let remote = three_question_remote();
    let camera = FakeCapture::granted();

    let first_ids = {
        let store: Arc<dyn DraftStore> = Arc::new(AuditStore::open_local(&db_path).await.unwrap());
        let ctx = context(&remote, &camera, store);
        let mut engine = AuditSessionEngine::open(ctx, AuditSession::new("audit-1", "sec-1"))
            .await
            .unwrap();
        let a = engine.add_violation("ans-2").await.unwrap().unwrap();
        let b = engine.add_violation("ans-new-2").await.unwrap().unwrap();
        assert!(!engine.violation(&a.local_id).await.unwrap().is_uploaded());

        remote.fail_create(&a.local_id);
        remote.fail_upload(FakeCapture::shot_path(2));
        let outcome = engine.finalize_session().await.unwrap();
        assert_eq!(outcome.report().violation_failures.len(), 2);
        (a.local_id, b.local_id)
    };
    assert_eq!(Calls::get(&remote.calls.uploads), 2);

    remote.heal();
    let store: Arc<dyn DraftStore> = Arc::new(AuditStore::open_local(&db_path).await.unwrap());
    let ctx = context(&remote, &camera, store);
    let mut engine = AuditSessionEngine::resume(ctx, "audit-1").await.unwrap();

    let a = engine.violation(&first_ids.0).await.unwrap();
    assert!(a.is_uploaded());
    assert!(!a.is_remote_created());
    assert!(!engine.violation(&first_ids.1).await.unwrap().is_uploaded());

    let outcome = engine.finalize_session().await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(Calls::get(&remote.calls.uploads), 3);
    let refs: Vec<String> = remote
        .created_violations()
        .into_iter()
        .map(|v| v.client_ref)
        .collect();
    assert_eq!(refs.len(), 2);
    assert!(refs.contains(&first_ids.0));
    assert!(refs.contains(&first_ids.1));
    assert_eq!(engine.state(), SessionState::Finalized);
}
