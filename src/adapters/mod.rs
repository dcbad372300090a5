//! Collaborator interfaces for external systems.
//!
//! The audit core treats transcription and analysis as opaque, fallible
//! collaborators behind traits, so batch processing can isolate their
//! failures per item and tests can substitute mocks.

pub mod http_analyzer;
pub mod matrix_loader;
pub mod store;
pub mod whisper;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisReport, ComplianceMatrix};

// Re-export the concrete collaborators
pub use http_analyzer::HttpAnalyzer;
pub use matrix_loader::load_matrix;
pub use store::EvaluationStore;
pub use whisper::WhisperTranscriber;

/// A transcribed call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub duration_seconds: f64,

    /// Time-aligned segments, when the backend produces them
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// A transcript built from bare text (no timing information).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// One time-aligned piece of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,

    /// Speaker/role label, when diarization is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Transcription collaborator. Failures are task-level, never fatal to a
/// batch job.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Transcribe an audio file.
    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Transcript>;
}

/// Analysis collaborator producing first-pass per-attribute opinions.
///
/// Output is untrusted: the applicability resolver may override its claims
/// and the scoring engine tolerates missing fields.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Judge a transcript against a compliance matrix.
    async fn analyze(
        &self,
        transcript: &Transcript,
        matrix: &ComplianceMatrix,
        context: &str,
    ) -> Result<AnalysisReport>;
}
