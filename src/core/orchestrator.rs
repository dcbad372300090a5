//! Batch job orchestrator.
//!
//! Accepts a batch of audio items sharing one compliance matrix, validates
//! it synchronously, then processes the items sequentially on a spawned
//! task. Job state lives in an in-memory registry keyed by job id; entries
//! are never evicted, so results stay readable after completion.
//!
//! Progress is published through a `tokio::sync::watch` channel per job: a
//! subscriber joining mid-run immediately observes the current snapshot,
//! and the `completed` counter never decreases. Each job has exactly one
//! writer (its own processing loop), so snapshots are internally
//! consistent.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::EvaluationStore;
use crate::domain::{ComplianceMatrix, Job, JobStatus, MatrixError, ProgressSnapshot};

use super::evaluator::Evaluator;
use super::summary::build_group_summary;

/// Rejections reported before a job is created.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid compliance matrix: {0}")]
    InvalidMatrix(#[from] MatrixError),

    #[error("batch contains no items")]
    NoItems,
}

/// One audio item in a batch request.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub name: String,
    pub path: PathBuf,
}

impl BatchItem {
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

struct JobHandle {
    job: Arc<RwLock<Job>>,
    progress: Arc<watch::Sender<ProgressSnapshot>>,
}

/// Owns the job registry and runs batch evaluations.
pub struct Orchestrator {
    evaluator: Arc<Evaluator>,
    store: Option<Arc<EvaluationStore>>,
    jobs: Arc<RwLock<HashMap<Uuid, JobHandle>>>,
    language: String,
}

impl Orchestrator {
    pub fn new(evaluator: Arc<Evaluator>, store: Option<Arc<EvaluationStore>>) -> Self {
        Self {
            evaluator,
            store,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            language: "es".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Validate and enqueue a batch. Returns the job id immediately; the
    /// items are processed on a background task.
    #[instrument(skip(self, matrix, items, context), fields(items = items.len()))]
    pub async fn submit(
        &self,
        matrix: ComplianceMatrix,
        items: Vec<BatchItem>,
        context: String,
    ) -> Result<Uuid, SubmitError> {
        matrix.validate()?;
        if items.is_empty() {
            return Err(SubmitError::NoItems);
        }

        let job_id = Uuid::new_v4();
        let job = Job::new(job_id, items.iter().map(|i| i.name.clone()).collect());
        let (progress, _) = watch::channel(job.snapshot());
        let progress = Arc::new(progress);
        let job = Arc::new(RwLock::new(job));

        {
            let mut jobs = self.jobs.write().await;
            jobs.insert(
                job_id,
                JobHandle {
                    job: Arc::clone(&job),
                    progress: Arc::clone(&progress),
                },
            );
        }

        info!(%job_id, "Batch job queued");

        let evaluator = Arc::clone(&self.evaluator);
        let store = self.store.clone();
        let language = self.language.clone();
        tokio::spawn(async move {
            run_job(job, progress, evaluator, store, matrix, items, context, language).await;
        });

        Ok(job_id)
    }

    /// Subscribe to a job's progress. The receiver starts at the current
    /// snapshot, so late subscribers see state immediately.
    pub async fn subscribe(&self, job_id: Uuid) -> Option<watch::Receiver<ProgressSnapshot>> {
        let jobs = self.jobs.read().await;
        jobs.get(&job_id).map(|h| h.progress.subscribe())
    }

    /// Fetch the full job state, including per-task results. Repeatable:
    /// reading a finished job does not consume it.
    pub async fn get_result(&self, job_id: Uuid) -> Option<Job> {
        let handle = {
            let jobs = self.jobs.read().await;
            jobs.get(&job_id).map(|h| Arc::clone(&h.job))
        }?;
        let job = handle.read().await;
        Some(job.clone())
    }
}

/// Sequential processing loop: the single writer for this job's state.
#[allow(clippy::too_many_arguments)]
async fn run_job(
    job: Arc<RwLock<Job>>,
    progress: Arc<watch::Sender<ProgressSnapshot>>,
    evaluator: Arc<Evaluator>,
    store: Option<Arc<EvaluationStore>>,
    matrix: ComplianceMatrix,
    items: Vec<BatchItem>,
    context: String,
    language: String,
) {
    let job_id = {
        let mut state = job.write().await;
        state.status = JobStatus::Running;
        let _ = progress.send(state.snapshot());
        state.id
    };

    for (idx, item) in items.iter().enumerate() {
        let result = evaluator
            .evaluate_audio(&item.path, &matrix, &context, &language)
            .await;

        let mut state = job.write().await;
        match result {
            Ok(outcome) => {
                if let Some(store) = &store {
                    if let Err(e) = store.save(&outcome) {
                        warn!(%job_id, item = %item.name, error = %e, "Failed to persist record");
                    }
                }
                state.items[idx].complete(outcome);
            }
            Err(e) => {
                // Task failures are data, not job failures.
                error!(%job_id, item = %item.name, error = %e, "Item evaluation failed");
                state.items[idx].fail(format!("{:#}", e));
            }
        }
        state.completed += 1;
        let _ = progress.send(state.snapshot());
    }

    let mut state = job.write().await;
    state.group_summary = Some(build_group_summary(&state.items));
    state.status = JobStatus::Done;
    state.finished_at = Some(Utc::now());
    let _ = progress.send(state.snapshot());

    info!(
        %job_id,
        completed = state.completed,
        "Batch job finished"
    );
}
