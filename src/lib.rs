//! callscope - Call-center compliance audit engine
//!
//! Evaluates recorded collection calls against a weighted compliance
//! matrix. Each call is transcribed, judged by an analysis collaborator,
//! cross-checked against deterministic evidence extracted from the
//! transcript, and scored by weighted deduction.
//!
//! # Architecture
//!
//! The pipeline treats the collaborator's judgments as untrusted input:
//! - Evidence extraction derives boolean signals from the transcript text
//! - Applicability resolution overrides collaborator claims the evidence
//!   cannot support
//! - The scoring engine applies deductions, category roll-ups and
//!   critical-attribute tracking
//! - The orchestrator runs batches with per-item failure isolation and
//!   live progress snapshots
//!
//! # Modules
//!
//! - `adapters`: External integrations (whisper, HTTP analyzer, storage)
//! - `evidence`: Text normalization and signal extraction
//! - `scoring`: Applicability resolution and the scoring engine
//! - `core`: The evaluation pipeline and batch orchestration
//! - `domain`: Data structures (matrix, verdicts, scores, jobs)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Evaluate one recording
//! callscope evaluate call.mp3 --matrix matrix.csv
//!
//! # Evaluate a whole campaign
//! callscope batch "calls/**/*.mp3" --matrix matrix.csv
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod evidence;
pub mod scoring;

// Re-export main types at crate root for convenience
pub use self::core::{BatchItem, Evaluator, Orchestrator, SubmitError};
pub use domain::{
    AnalysisReport, AttributeVerdict, ComplianceMatrix, EvaluationOutcome, GroupSummary, Job,
    JobStatus, MatrixAttribute, ProgressSnapshot, ScoreResult, VerdictStatus,
};
pub use evidence::{extract_evidence, EvidenceSignals, SignalLexicon};
pub use scoring::{resolve_applicability, score, ScoringPolicy};
