//! Batch job state.
//!
//! A `Job` is one batch run over many audio items sharing a single
//! compliance matrix. Its status moves `Queued → Running → Done` and never
//! regresses; partial failures live on individual `TaskRecord`s, never on
//! the job itself. The job and its tasks are written only by the
//! orchestrator's own processing loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evaluation::EvaluationOutcome;

/// Job-level status. No error state: failures are per-task data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
}

/// Per-item status. Each task leaves `Pending` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
    Error,
}

/// One audio item's outcome within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,

    pub status: TaskStatus,

    /// Present iff `status == Done`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationOutcome>,

    /// Present iff `status == Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn complete(&mut self, outcome: EvaluationOutcome) {
        self.status = TaskStatus::Done;
        self.result = Some(outcome);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = TaskStatus::Error;
        self.error = Some(message.into());
        self.result = None;
    }
}

/// One batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,

    pub status: JobStatus,

    /// Item count, fixed at creation
    pub total: usize,

    /// Monotonically increasing count of tasks that left `Pending`
    pub completed: usize,

    pub items: Vec<TaskRecord>,

    /// Computed exactly once, after the last task resolves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_summary: Option<GroupSummary>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a job with every item pending.
    pub fn new(id: Uuid, item_names: Vec<String>) -> Self {
        let items: Vec<TaskRecord> = item_names.into_iter().map(TaskRecord::pending).collect();
        Self {
            id,
            status: JobStatus::Queued,
            total: items.len(),
            completed: 0,
            items,
            group_summary: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }

    /// Lightweight view published to subscribers after every transition.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            job_id: self.id,
            status: self.status,
            total: self.total,
            completed: self.completed,
            items: self
                .items
                .iter()
                .map(|t| TaskView {
                    name: t.name.clone(),
                    status: t.status,
                    error: t.error.clone(),
                })
                .collect(),
        }
    }
}

/// A task as seen in a progress snapshot (no result payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub name: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Read-only progress view published to subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    pub items: Vec<TaskView>,
}

/// One frequency-ranked entry in the group summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub text: String,
    pub count: usize,
}

/// Aggregate over a finished job's successful tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Items submitted
    pub total: usize,
    /// Items that finished `Done` and feed the aggregates
    pub evaluated: usize,
    /// Items that ended in `Error` (excluded from aggregates)
    pub failed: usize,
    /// Mean final score across evaluated items; 0 when none succeeded
    pub average_score: f64,
    pub top_findings: Vec<RankedEntry>,
    pub top_recommendations: Vec<RankedEntry>,
    pub top_critical: Vec<RankedEntry>,
    /// Human-readable narrative built from the rankings
    pub narrative: String,
}
