//! Domain types for the callscope audit engine.
//!
//! This module contains the core data structures:
//! - Matrix: the compliance criteria one evaluation is scored against
//! - Verdict: per-attribute judgments and the analysis report shape
//! - Score: deductions, category roll-ups and the final score
//! - Evaluation: the finished record of one evaluated call
//! - Job: batch run state, task records and progress snapshots

pub mod evaluation;
pub mod job;
pub mod matrix;
pub mod score;
pub mod verdict;

// Re-export commonly used types
pub use evaluation::EvaluationOutcome;
pub use job::{
    GroupSummary, Job, JobStatus, ProgressSnapshot, RankedEntry, TaskRecord, TaskStatus, TaskView,
};
pub use matrix::{ComplianceMatrix, MatrixAttribute, MatrixError, DEFAULT_CRITICAL_THRESHOLD};
pub use score::{CategoryBreakdown, ScoreResult, ScoredAttribute, BASE_SCORE};
pub use verdict::{AnalysisReport, AttributeVerdict, VerdictStatus};
