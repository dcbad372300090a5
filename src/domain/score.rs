//! Score result types.
//!
//! A `ScoreResult` is the scoring engine's complete output for one
//! evaluation: per-attribute deductions, per-category roll-ups and the
//! clamped final score.

use serde::{Deserialize, Serialize};

use super::verdict::AttributeVerdict;

/// Every evaluation starts from this score and loses weight per unfulfilled
/// applicable attribute.
pub const BASE_SCORE: f64 = 100.0;

/// One scored matrix attribute (or an informational extra from the
/// collaborator, carried with weight 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredAttribute {
    pub verdict: AttributeVerdict,

    /// Matrix weight; 0 for informational entries absent from the matrix
    pub weight: f64,

    /// `weight` when applicable and unfulfilled, else 0
    pub deduction: f64,

    pub critical: bool,

    /// True for collaborator verdicts with no matrix counterpart; these
    /// never affect the final score or category roll-ups
    #[serde(default)]
    pub informational: bool,
}

/// Per-category roll-up. NA attributes are excluded from the percentage
/// denominator and tracked separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub fulfilled_count: usize,
    pub unfulfilled_count: usize,
    pub not_applicable_count: usize,
    /// Rounded percent of applicable attributes fulfilled; 0 when none apply
    pub percentage: u32,
}

/// Full scoring output for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub base_score: f64,
    pub total_deduction: f64,
    /// `clamp(base − total_deduction, 0, 100)`
    pub final_score: f64,
    /// Matrix order first, then informational extras in response order
    pub per_attribute: Vec<ScoredAttribute>,
    pub per_category: Vec<CategoryBreakdown>,
    /// Names of critical attributes that applied and were unfulfilled
    pub critical_affected: Vec<String>,
}

impl ScoreResult {
    /// True when no critical attribute failed.
    pub fn critical_clean(&self) -> bool {
        self.critical_affected.is_empty()
    }
}
