//! Weighted scoring engine.
//!
//! Given a compliance matrix and finalized verdicts, computes per-attribute
//! deductions, per-category roll-ups and the clamped final score. The
//! engine never mutates applicability: it only reads resolved verdicts,
//! applies the caller's forced-NA override set and the fallback policies
//! for missing data, and accumulates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{
    AttributeVerdict, CategoryBreakdown, ComplianceMatrix, ScoreResult, ScoredAttribute,
    VerdictStatus, BASE_SCORE, DEFAULT_CRITICAL_THRESHOLD,
};
use crate::evidence::normalized_key;

/// Explicit policy knobs for one scoring pass.
///
/// The fallback behaviors here are deliberate policy, not incidental code
/// paths: missing fulfillment fails critical attributes and passes
/// non-critical ones, unless strict mode turns ambiguity into NA instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Weight at/above which an attribute is critical
    pub critical_threshold: f64,

    /// Default unproven attributes to NA instead of applicable-and-passing
    pub strict_mode: bool,

    /// Normalized attribute names the caller forces to NA, orthogonal to
    /// the evidence-based resolution
    #[serde(default)]
    pub forced_na: HashSet<String>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            strict_mode: false,
            forced_na: HashSet::new(),
        }
    }
}

impl ScoringPolicy {
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Default::default()
        }
    }

    /// Add a caller-level forced-NA attribute (any phrasing variant).
    pub fn force_na(mut self, attribute: &str) -> Self {
        self.forced_na.insert(normalized_key(attribute));
        self
    }

    fn is_forced_na(&self, key: &str) -> bool {
        self.forced_na.contains(key)
    }
}

/// Score one evaluation.
///
/// Iterates matrix attributes in matrix order so output is stable regardless
/// of collaborator response ordering. Verdicts absent from the matrix are
/// retained as zero-weight informational entries that never affect the
/// final score.
pub fn score(
    matrix: &ComplianceMatrix,
    verdicts: &[AttributeVerdict],
    policy: &ScoringPolicy,
) -> ScoreResult {
    let mut per_attribute = Vec::with_capacity(verdicts.len().max(matrix.len()));
    let mut total_deduction = 0.0;
    let mut critical_affected = Vec::new();
    let mut categories: Vec<CategoryBreakdown> = Vec::new();
    let mut matrix_keys: HashSet<String> = HashSet::with_capacity(matrix.len());

    for attr in &matrix.attributes {
        let key = attr.key();
        matrix_keys.insert(key.clone());
        let critical = attr.is_critical(policy.critical_threshold);

        let verdict = finalize_verdict(
            &attr.name,
            verdicts.iter().find(|v| normalized_key(&v.attribute) == key),
            critical,
            policy.is_forced_na(&key),
            policy.strict_mode,
        );

        let applicable = verdict.applies;
        let fulfilled = verdict.fulfilled;
        let deduction = if applicable && fulfilled == Some(false) {
            attr.weight
        } else {
            0.0
        };
        total_deduction += deduction;

        if critical && applicable && fulfilled == Some(false) {
            critical_affected.push(attr.name.clone());
        }

        tally_category(&mut categories, &attr.category, applicable, fulfilled);

        per_attribute.push(ScoredAttribute {
            verdict,
            weight: attr.weight,
            deduction,
            critical,
            informational: false,
        });
    }

    // Informational extras: collaborator verdicts with no matrix row.
    for verdict in verdicts {
        if !matrix_keys.contains(&normalized_key(&verdict.attribute)) {
            let mut extra = verdict.clone();
            extra.normalize();
            // Extras carry no weight, so the fulfillment fallback cannot
            // apply; ambiguous ones demote to NA.
            extra.demote_unfulfilled();
            per_attribute.push(ScoredAttribute {
                verdict: extra,
                weight: 0.0,
                deduction: 0.0,
                critical: false,
                informational: true,
            });
        }
    }

    for cat in &mut categories {
        let applicable = cat.fulfilled_count + cat.unfulfilled_count;
        // Zero applicable attributes report 0, never NaN.
        cat.percentage = if applicable == 0 {
            0
        } else {
            ((cat.fulfilled_count as f64 / applicable as f64) * 100.0).round() as u32
        };
    }

    let final_score = (BASE_SCORE - total_deduction).clamp(0.0, 100.0);

    ScoreResult {
        base_score: BASE_SCORE,
        total_deduction,
        final_score,
        per_attribute,
        per_category: categories,
        critical_affected,
    }
}

/// Apply the engine-level overrides and fallback policies to one attribute.
fn finalize_verdict(
    name: &str,
    resolved: Option<&AttributeVerdict>,
    critical: bool,
    forced_na: bool,
    strict_mode: bool,
) -> AttributeVerdict {
    if forced_na {
        return AttributeVerdict::not_applicable(name, "excluded by caller override");
    }

    let mut verdict = match resolved {
        Some(v) => {
            let mut v = v.clone();
            v.attribute = name.to_string();
            v.normalize();
            v
        }
        None if strict_mode => AttributeVerdict::not_applicable(
            name,
            super::applicability::STRICT_NA_JUSTIFICATION,
        ),
        // Absent verdict defaults to applicable; fulfillment falls through
        // to the ambiguity policy below.
        None => AttributeVerdict {
            attribute: name.to_string(),
            applies: true,
            status: VerdictStatus::Ok,
            fulfilled: None,
            justification: String::new(),
            improvement: None,
        },
    };

    if verdict.applies && verdict.fulfilled.is_none() {
        if strict_mode {
            // Strict mode refuses to guess.
            verdict = AttributeVerdict::not_applicable(
                name,
                super::applicability::STRICT_NA_JUSTIFICATION,
            );
        } else if critical {
            // Fail closed on ambiguity for critical attributes.
            verdict.fulfilled = Some(false);
            if verdict.justification.is_empty() {
                verdict.justification =
                    "no explicit fulfillment reported; critical attributes fail closed".to_string();
            }
        } else {
            verdict.fulfilled = Some(true);
        }
    }

    verdict
}

fn tally_category(
    categories: &mut Vec<CategoryBreakdown>,
    category: &str,
    applicable: bool,
    fulfilled: Option<bool>,
) {
    let idx = match categories.iter().position(|c| c.category == category) {
        Some(idx) => idx,
        None => {
            categories.push(CategoryBreakdown {
                category: category.to_string(),
                fulfilled_count: 0,
                unfulfilled_count: 0,
                not_applicable_count: 0,
                percentage: 0,
            });
            categories.len() - 1
        }
    };
    let entry = &mut categories[idx];

    if !applicable {
        entry.not_applicable_count += 1;
    } else if fulfilled == Some(false) {
        entry.unfulfilled_count += 1;
    } else {
        entry.fulfilled_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MatrixAttribute;

    fn attr(name: &str, category: &str, weight: f64) -> MatrixAttribute {
        MatrixAttribute {
            name: name.to_string(),
            category: category.to_string(),
            weight,
        }
    }

    fn two_attr_matrix() -> ComplianceMatrix {
        ComplianceMatrix::new(vec![attr("A", "Apertura", 30.0), attr("B", "Cierre", 20.0)])
    }

    #[test]
    fn test_basic_deduction() {
        let verdicts = vec![
            AttributeVerdict::judged("A", false, "missed"),
            AttributeVerdict::judged("B", true, "done"),
        ];
        let result = score(&two_attr_matrix(), &verdicts, &ScoringPolicy::default());
        assert_eq!(result.total_deduction, 30.0);
        assert_eq!(result.final_score, 70.0);
    }

    #[test]
    fn test_na_contributes_nothing() {
        let verdicts = vec![
            AttributeVerdict::not_applicable("A", "did not apply"),
            AttributeVerdict::judged("B", true, ""),
        ];
        let result = score(&two_attr_matrix(), &verdicts, &ScoringPolicy::default());
        assert_eq!(result.total_deduction, 0.0);
        assert_eq!(result.final_score, 100.0);
        assert_eq!(result.per_category[0].not_applicable_count, 1);
        assert_eq!(result.per_category[0].percentage, 0);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let matrix = ComplianceMatrix::new(vec![
            attr("A", "X", 80.0),
            attr("B", "X", 80.0),
        ]);
        let verdicts = vec![
            AttributeVerdict::judged("A", false, ""),
            AttributeVerdict::judged("B", false, ""),
        ];
        let result = score(&matrix, &verdicts, &ScoringPolicy::default());
        assert_eq!(result.total_deduction, 160.0);
        assert_eq!(result.final_score, 0.0);
    }

    #[test]
    fn test_matrix_order_wins_over_response_order() {
        let verdicts = vec![
            AttributeVerdict::judged("B", true, ""),
            AttributeVerdict::judged("A", true, ""),
        ];
        let result = score(&two_attr_matrix(), &verdicts, &ScoringPolicy::default());
        assert_eq!(result.per_attribute[0].verdict.attribute, "A");
        assert_eq!(result.per_attribute[1].verdict.attribute, "B");
    }

    #[test]
    fn test_missing_fulfillment_fallbacks() {
        let matrix = ComplianceMatrix::new(vec![
            attr("Critical", "X", 100.0),
            attr("Minor", "X", 10.0),
        ]);
        let ambiguous = |name: &str| AttributeVerdict {
            attribute: name.to_string(),
            applies: true,
            status: VerdictStatus::Ok,
            fulfilled: None,
            justification: String::new(),
            improvement: None,
        };
        let verdicts = vec![ambiguous("Critical"), ambiguous("Minor")];

        let result = score(&matrix, &verdicts, &ScoringPolicy::default());
        // Critical fails closed, minor passes.
        assert_eq!(result.total_deduction, 100.0);
        assert_eq!(result.critical_affected, vec!["Critical".to_string()]);

        // Strict mode refuses to guess: both NA.
        let result = score(&matrix, &verdicts, &ScoringPolicy::strict());
        assert_eq!(result.total_deduction, 0.0);
        assert!(result.critical_affected.is_empty());
        assert!(result.per_attribute.iter().all(|a| !a.verdict.applies));
    }

    #[test]
    fn test_missing_verdict_defaults() {
        let matrix = ComplianceMatrix::new(vec![attr("Minor", "X", 10.0)]);

        // Default policy: absent verdict applies and passes.
        let result = score(&matrix, &[], &ScoringPolicy::default());
        assert_eq!(result.final_score, 100.0);
        assert!(result.per_attribute[0].verdict.applies);

        // Forced-NA set excludes it.
        let policy = ScoringPolicy::default().force_na("MINOR");
        let result = score(&matrix, &[], &policy);
        assert!(!result.per_attribute[0].verdict.applies);

        // Strict mode also forces NA on absence.
        let result = score(&matrix, &[], &ScoringPolicy::strict());
        assert!(!result.per_attribute[0].verdict.applies);
    }

    #[test]
    fn test_informational_extras_never_affect_score() {
        let verdicts = vec![
            AttributeVerdict::judged("A", true, ""),
            AttributeVerdict::judged("B", true, ""),
            AttributeVerdict::judged("Tono de voz", false, "monotone"),
        ];
        let result = score(&two_attr_matrix(), &verdicts, &ScoringPolicy::default());
        assert_eq!(result.final_score, 100.0);
        let extra = result.per_attribute.last().unwrap();
        assert!(extra.informational);
        assert_eq!(extra.weight, 0.0);
        assert_eq!(extra.deduction, 0.0);
    }

    #[test]
    fn test_unfulfilled_extra_demotes_to_na() {
        let matrix = ComplianceMatrix::new(vec![attr("Saludo", "Apertura", 10.0)]);
        // An extra claiming applicability but rendering no fulfillment,
        // as a partial collaborator response would parse.
        let extra = AttributeVerdict {
            attribute: "Tono de voz".to_string(),
            applies: true,
            status: VerdictStatus::Ok,
            fulfilled: None,
            justification: String::new(),
            improvement: None,
        };
        let verdicts = vec![AttributeVerdict::judged("Saludo", true, ""), extra];

        let result = score(&matrix, &verdicts, &ScoringPolicy::default());

        // Every Ok verdict reaching callers carries a boolean fulfillment.
        for scored in &result.per_attribute {
            if scored.verdict.status == VerdictStatus::Ok {
                assert!(scored.verdict.fulfilled.is_some());
            }
        }
        let tono = result.per_attribute.last().unwrap();
        assert!(tono.informational);
        assert_eq!(tono.verdict.status, VerdictStatus::NotApplicable);
        assert_eq!(tono.verdict.fulfilled, None);
        assert!(!tono.verdict.justification.is_empty());
        assert_eq!(result.final_score, 100.0);
    }

    #[test]
    fn test_category_percentage_rounds() {
        let matrix = ComplianceMatrix::new(vec![
            attr("A", "X", 10.0),
            attr("B", "X", 10.0),
            attr("C", "X", 10.0),
        ]);
        let verdicts = vec![
            AttributeVerdict::judged("A", true, ""),
            AttributeVerdict::judged("B", true, ""),
            AttributeVerdict::judged("C", false, ""),
        ];
        let result = score(&matrix, &verdicts, &ScoringPolicy::default());
        assert_eq!(result.per_category[0].percentage, 67);
    }
}
