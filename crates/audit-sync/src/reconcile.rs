//! Reconciliation of the question catalog against an audit's answers.
//!
//! Opening an audit makes sure exactly one answer record exists per catalog
//! question. The decision is always taken against a fresh fetch of the
//! answers, never a cached list, so running it twice creates nothing the
//! second time.

use std::collections::{HashMap, HashSet};

use audit_core::entities::{AnswerRecord, QuestionDefinition};
use audit_core::ports::{AnswerFields, CatalogClient, MutationClient};

use crate::error::SyncError;

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Answer records in display order.
    pub answers: Vec<AnswerRecord>,
    /// Answer records created by this run.
    pub created: usize,
}

/// Ensure one answer record per question of `section_id` exists for
/// `audit_id` and return them ordered by the questions' sort order.
///
/// Creates are issued one at a time. Ties in sort order keep catalog order;
/// answers whose question is no longer in the catalog go last.
///
/// # Errors
///
/// - [`SyncError::CatalogFetch`] if a question or answer fetch fails or does
///   not report success.
/// - [`SyncError::RemoteCreate`] if creating a missing answer record fails.
///   Records created before the failure stay; re-running picks up from there.
pub async fn reconcile(
    catalog: &dyn CatalogClient,
    mutations: &dyn MutationClient,
    audit_id: &str,
    section_id: &str,
) -> Result<Reconciliation, SyncError> {
    let questions = catalog
        .fetch_questions(section_id)
        .await
        .and_then(|env| env.into_items("questions"))
        .map_err(SyncError::CatalogFetch)?;
    let existing = fetch_answers(catalog, audit_id).await?;

    let mut answered: HashSet<&str> = existing.iter().map(|a| a.question_id.as_str()).collect();
    let mut created = 0;
    for question in &questions {
        if !answered.insert(question.question_id.as_str()) {
            continue;
        }
        tracing::debug!(audit_id, question_id = %question.question_id, "creating missing answer record");
        let fields = AnswerFields::Create {
            audit_id: audit_id.to_string(),
            question_id: question.question_id.clone(),
            question_text_snapshot: question.text.clone(),
        };
        mutations
            .upsert_answer(None, &fields)
            .await
            .and_then(|env| env.into_items("answer create"))
            .map_err(|source| SyncError::RemoteCreate {
                unit: format!("answer for question {}", question.question_id),
                source,
            })?;
        created += 1;
    }

    let answers = if created == 0 {
        existing
    } else {
        fetch_answers(catalog, audit_id).await?
    };
    tracing::info!(audit_id, section_id, questions = questions.len(), created, "reconciled");

    Ok(Reconciliation {
        answers: order_answers(answers, &questions),
        created,
    })
}

async fn fetch_answers(
    catalog: &dyn CatalogClient,
    audit_id: &str,
) -> Result<Vec<AnswerRecord>, SyncError> {
    catalog
        .fetch_answer_records(audit_id)
        .await
        .and_then(|env| env.into_items("answer records"))
        .map_err(SyncError::CatalogFetch)
}

/// Stable sort by (sort order, catalog position); unknown questions last.
pub(crate) fn order_answers(
    mut answers: Vec<AnswerRecord>,
    questions: &[QuestionDefinition],
) -> Vec<AnswerRecord> {
    let mut rank: HashMap<&str, (i64, usize)> = HashMap::with_capacity(questions.len());
    for (idx, q) in questions.iter().enumerate() {
        rank.entry(q.question_id.as_str()).or_insert((q.sort_key(), idx));
    }
    answers.sort_by_key(|a| {
        rank.get(a.question_id.as_str()).map_or((1, 0, 0), |&(order, idx)| (0, order, idx))
    });
    answers
}
