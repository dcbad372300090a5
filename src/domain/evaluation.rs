//! The finished record of one evaluated call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::score::ScoreResult;
use super::verdict::AttributeVerdict;
use crate::evidence::EvidenceSignals;

/// Everything produced by evaluating one audio file or transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    /// Item name (usually the audio file name)
    pub name: String,

    /// Content-hash id of the audio, when evaluated from a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_hash: Option<String>,

    pub transcript: String,

    /// Deterministic signals the resolver worked from
    pub evidence: EvidenceSignals,

    /// Finalized (resolved + normalized) verdicts
    pub verdicts: Vec<AttributeVerdict>,

    pub score: ScoreResult,

    pub findings: Vec<String>,
    pub recommendations: Vec<String>,

    pub evaluated_at: DateTime<Utc>,
}
