//! Evaluation pipeline and batch orchestration.
//!
//! This module contains:
//! - Evaluator: the per-call pipeline (transcribe, analyze, resolve, score)
//! - Orchestrator: batch jobs, the job registry and progress publishing
//! - Summary: group-level aggregation over finished batches

pub mod evaluator;
pub mod orchestrator;
pub mod summary;

// Re-export main types
pub use evaluator::Evaluator;
pub use orchestrator::{BatchItem, Orchestrator, SubmitError};
pub use summary::build_group_summary;
