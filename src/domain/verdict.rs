//! Per-attribute verdicts and the analysis collaborator's report shape.
//!
//! The analysis collaborator proposes an initial verdict per attribute; the
//! applicability resolver may forcibly convert it to not-applicable, and the
//! scoring engine only reads the resolved result. Collaborator output is
//! treated as untrusted: every field is defaulted on deserialization so a
//! malformed response degrades into the engine's fallback policy instead of
//! an error.

use serde::{Deserialize, Serialize};

/// Whether an attribute was evaluable on this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Attribute applied and was judged
    Ok,
    /// Attribute did not apply to this call
    NotApplicable,
}

impl Default for VerdictStatus {
    fn default() -> Self {
        Self::Ok
    }
}

/// Judgment for one attribute on one evaluation.
///
/// Invariant: `fulfilled` is `Some` iff `applies` is true. `normalize()`
/// enforces this before the verdict reaches the scoring engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeVerdict {
    /// Attribute name as reported (matched case/accent-insensitively)
    pub attribute: String,

    /// Whether the attribute's conditions of activation occurred at all
    #[serde(default)]
    pub applies: bool,

    #[serde(default)]
    pub status: VerdictStatus,

    /// Some(true/false) when the attribute applies, None when NA
    #[serde(default)]
    pub fulfilled: Option<bool>,

    /// Free-text reasoning (may be empty)
    #[serde(default)]
    pub justification: String,

    /// Suggested improvement, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<String>,
}

impl AttributeVerdict {
    /// A verdict forced to not-applicable with a generated justification.
    pub fn not_applicable(attribute: impl Into<String>, justification: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            applies: false,
            status: VerdictStatus::NotApplicable,
            fulfilled: None,
            justification: justification.into(),
            improvement: None,
        }
    }

    /// An applicable verdict with an explicit fulfillment.
    pub fn judged(
        attribute: impl Into<String>,
        fulfilled: bool,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            applies: true,
            status: VerdictStatus::Ok,
            fulfilled: Some(fulfilled),
            justification: justification.into(),
            improvement: None,
        }
    }

    /// Enforce the `fulfilled`/`applies` invariant in place.
    ///
    /// A non-applicable verdict loses any stray fulfillment; an applicable
    /// verdict keeps `fulfilled = None` (the engine's fallback policy decides
    /// what a missing fulfillment means). `status` is kept consistent with
    /// `applies`.
    pub fn normalize(&mut self) {
        if self.applies {
            self.status = VerdictStatus::Ok;
        } else {
            self.status = VerdictStatus::NotApplicable;
            self.fulfilled = None;
        }
    }

    /// Convert an applicable verdict with no fulfillment into NA.
    ///
    /// Used for collaborator verdicts with no matrix counterpart: they have
    /// no weight to anchor the engine's missing-fulfillment fallback, so
    /// ambiguity demotes them to informational NA instead of guessing.
    pub fn demote_unfulfilled(&mut self) {
        if self.applies && self.fulfilled.is_none() {
            self.applies = false;
            self.normalize();
            if self.justification.trim().is_empty() {
                self.justification =
                    "no explicit fulfillment reported; kept as informational only".to_string();
            }
        }
    }

    /// Check the invariant without mutating (used by tests and debug asserts).
    pub fn is_well_formed(&self) -> bool {
        match self.status {
            VerdictStatus::Ok => self.applies,
            VerdictStatus::NotApplicable => !self.applies && self.fulfilled.is_none(),
        }
    }
}

/// The analysis collaborator's full response for one transcript.
///
/// Every field defaults so partial responses parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub verdicts: Vec<AttributeVerdict>,

    #[serde(default)]
    pub findings: Vec<String>,

    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Collaborator's own summary of the call, if it produced one
    #[serde(default)]
    pub summary: Option<String>,
}
