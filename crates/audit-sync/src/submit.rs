//! Finalize protocol: push scores, sync violations, report.
//!
//! Every unit of work (one score push, one entry's upload-then-create pair)
//! runs as its own task under a shared semaphore. Failures are collected per
//! unit and never stop the others. Within an entry the remote URL is
//! committed through the queue, and so persisted, before the create is sent.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use audit_core::entities::AnswerRecord;
use audit_core::enums::SyncStage;
use audit_core::errors::PortError;
use audit_core::ports::{AnswerFields, MutationClient, ViolationPayload};
use audit_core::responses::{EntryFailure, ScoreFailure};

use crate::error::SyncError;
use crate::queue::ViolationQueue;

/// What happened to the violation entries during one run.
#[derive(Debug, Default)]
pub(crate) struct ViolationSync {
    pub synced: usize,
    pub already_synced: usize,
    pub failures: Vec<EntryFailure>,
}

pub(crate) struct SubmissionCoordinator {
    mutations: Arc<dyn MutationClient>,
    queue: Arc<Mutex<ViolationQueue>>,
    max_parallel: usize,
}

impl SubmissionCoordinator {
    pub(crate) fn new(
        mutations: Arc<dyn MutationClient>,
        queue: Arc<Mutex<ViolationQueue>>,
        max_parallel: usize,
    ) -> Self {
        Self {
            mutations,
            queue,
            max_parallel: max_parallel.max(1),
        }
    }

    /// Push the current score of every answer. Returns the success count and
    /// the failures.
    pub(crate) async fn push_scores(&self, answers: &[AnswerRecord]) -> (usize, Vec<ScoreFailure>) {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut set = JoinSet::new();
        for answer in answers {
            let sem = Arc::clone(&semaphore);
            let mutations = Arc::clone(&self.mutations);
            let answer_id = answer.answer_id.clone();
            let fields = AnswerFields::Score {
                score: answer.score.clone(),
            };
            set.spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (answer_id, Err(PortError::Other(anyhow_closed())));
                };
                let result = mutations
                    .upsert_answer(Some(&answer_id), &fields)
                    .await
                    .and_then(|env| env.into_items("score update"))
                    .map(drop);
                (answer_id, result)
            });
        }

        let mut pending: HashSet<String> = answers.iter().map(|a| a.answer_id.clone()).collect();
        let mut pushed = 0;
        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            let Ok((answer_id, result)) = joined else {
                continue;
            };
            pending.remove(&answer_id);
            match result {
                Ok(()) => pushed += 1,
                Err(e) => {
                    tracing::warn!(%answer_id, error = %e, "score push failed");
                    failures.push(ScoreFailure {
                        answer_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        for answer_id in pending {
            failures.push(ScoreFailure {
                answer_id,
                reason: "score push task aborted".into(),
            });
        }
        failures.sort_by(|a, b| a.answer_id.cmp(&b.answer_id));
        (pushed, failures)
    }

    /// Upload and create every entry that is not yet remote-created.
    pub(crate) async fn sync_violations(&self) -> ViolationSync {
        let mut outcome = ViolationSync::default();
        let pending: Vec<(String, String)> = {
            let queue = self.queue.lock().await;
            let mut pending = Vec::new();
            for entry in queue.iter() {
                if entry.is_remote_created() {
                    outcome.already_synced += 1;
                } else {
                    pending.push((entry.local_id.clone(), entry.answer_id.clone()));
                }
            }
            pending
        };

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut set = JoinSet::new();
        for (local_id, _) in &pending {
            let sem = Arc::clone(&semaphore);
            let mutations = Arc::clone(&self.mutations);
            let queue = Arc::clone(&self.queue);
            let local_id = local_id.clone();
            set.spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return (
                        local_id.clone(),
                        Err(SyncError::Upload {
                            local_id,
                            source: PortError::Other(anyhow_closed()),
                        }),
                    );
                };
                let result = sync_entry(&queue, mutations.as_ref(), &local_id).await;
                (local_id, result)
            });
        }

        let mut unfinished: HashSet<&str> = pending.iter().map(|(id, _)| id.as_str()).collect();
        while let Some(joined) = set.join_next().await {
            let Ok((local_id, result)) = joined else {
                continue;
            };
            unfinished.remove(local_id.as_str());
            match result {
                Ok(()) => outcome.synced += 1,
                Err(e) => {
                    tracing::warn!(%local_id, error = %e, "violation sync failed");
                    let answer_id = answer_of(&pending, &local_id);
                    outcome.failures.push(failure(local_id, answer_id, &e));
                }
            }
        }
        for (local_id, answer_id) in &pending {
            if unfinished.contains(local_id.as_str()) {
                outcome.failures.push(EntryFailure {
                    local_id: local_id.clone(),
                    answer_id: answer_id.clone(),
                    stage: SyncStage::Upload,
                    reason: "sync task aborted".into(),
                });
            }
        }
        outcome.failures.sort_by(|a, b| a.local_id.cmp(&b.local_id));
        outcome
    }
}

/// One entry's protocol: upload unless a URL is committed, then create.
async fn sync_entry(
    queue: &Mutex<ViolationQueue>,
    mutations: &dyn MutationClient,
    local_id: &str,
) -> Result<(), SyncError> {
    let entry = queue
        .lock()
        .await
        .get(local_id)
        .cloned()
        .ok_or_else(|| SyncError::not_found("violation", local_id))?;

    let payload = if let Some(payload) = ViolationPayload::from_entry(&entry) {
        payload
    } else {
        let url = mutations
            .upload_photo(&entry.photo_local_path)
            .await
            .map_err(|source| SyncError::Upload {
                local_id: local_id.to_string(),
                source,
            })?;
        tracing::debug!(local_id, %url, "photo uploaded");

        let mut queue = queue.lock().await;
        queue.mark_uploaded(local_id, url).await?;
        let committed = queue
            .get(local_id)
            .ok_or_else(|| SyncError::not_found("violation", local_id))?;
        ViolationPayload::from_entry(committed).ok_or_else(|| {
            SyncError::InvariantViolation(format!("violation {local_id} lost its photo URL"))
        })?
    };

    mutations
        .create_violation(&payload)
        .await
        .and_then(|env| env.into_items("violation create"))
        .map_err(|source| SyncError::RemoteCreate {
            unit: format!("violation {local_id}"),
            source,
        })?;
    queue.lock().await.mark_created(local_id).await?;
    tracing::debug!(local_id, "violation created remotely");
    Ok(())
}

fn answer_of(pending: &[(String, String)], local_id: &str) -> String {
    pending
        .iter()
        .find(|(id, _)| id == local_id)
        .map(|(_, answer_id)| answer_id.clone())
        .unwrap_or_default()
}

fn failure(local_id: String, answer_id: String, err: &SyncError) -> EntryFailure {
    let (stage, reason) = match err {
        SyncError::Upload { source, .. } => (SyncStage::Upload, source.to_string()),
        SyncError::RemoteCreate { source, .. } => (SyncStage::Create, source.to_string()),
        other => (SyncStage::Create, other.to_string()),
    };
    EntryFailure {
        local_id,
        answer_id,
        stage,
        reason,
    }
}

fn anyhow_closed() -> anyhow::Error {
    anyhow::anyhow!("concurrency limiter closed")
}
