//! Group summary aggregation.
//!
//! After the last task of a batch resolves, the orchestrator folds the
//! successful outcomes into one `GroupSummary`: average score, frequency
//! rankings of findings, recommendations and failed critical attributes,
//! and a short narrative. Ties rank by first appearance so reruns over the
//! same inputs produce the same ordering.

use std::collections::{HashMap, HashSet};

use crate::domain::{GroupSummary, RankedEntry, TaskRecord, TaskStatus};
use crate::evidence::normalized_key;

/// How many entries each ranking keeps.
const TOP_N: usize = 5;

/// Build the aggregate summary over a finished job's tasks.
pub fn build_group_summary(items: &[TaskRecord]) -> GroupSummary {
    let outcomes: Vec<_> = items.iter().filter_map(|t| t.result.as_ref()).collect();
    let failed = items
        .iter()
        .filter(|t| t.status == TaskStatus::Error)
        .count();

    let evaluated = outcomes.len();
    let average_score = if evaluated == 0 {
        0.0
    } else {
        outcomes.iter().map(|o| o.score.final_score).sum::<f64>() / evaluated as f64
    };

    let top_findings = rank(outcomes.iter().map(|o| o.findings.iter()));
    let top_recommendations = rank(outcomes.iter().map(|o| o.recommendations.iter()));
    let top_critical = rank(outcomes.iter().map(|o| o.score.critical_affected.iter()));

    let narrative = build_narrative(
        items.len(),
        evaluated,
        failed,
        average_score,
        &top_findings,
        &top_critical,
    );

    GroupSummary {
        total: items.len(),
        evaluated,
        failed,
        average_score,
        top_findings,
        top_recommendations,
        top_critical,
        narrative,
    }
}

/// Frequency-rank texts across calls. Counts are per call: an entry
/// repeated within one call's list still counts once, so "N" in the
/// narrative means N calls. Matching uses the normalized key so accent and
/// casing variants count as one entry; the first-seen spelling is kept.
fn rank<'a, C, I>(calls: C) -> Vec<RankedEntry>
where
    C: Iterator<Item = I>,
    I: Iterator<Item = &'a String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new(); // (key, display text)

    for texts in calls {
        let mut seen_this_call: HashSet<String> = HashSet::new();
        for text in texts {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let key = normalized_key(trimmed);
            if !seen_this_call.insert(key.clone()) {
                continue;
            }
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push((key, trimmed.to_string()));
            }
            *count += 1;
        }
    }

    let mut entries: Vec<RankedEntry> = order
        .into_iter()
        .map(|(key, text)| RankedEntry {
            text,
            count: counts[&key],
        })
        .collect();

    // Stable sort keeps first-seen order among equal counts.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(TOP_N);
    entries
}

fn build_narrative(
    total: usize,
    evaluated: usize,
    failed: usize,
    average_score: f64,
    top_findings: &[RankedEntry],
    top_critical: &[RankedEntry],
) -> String {
    let mut narrative = format!(
        "Evaluated {} of {} calls (failed: {}). Average score: {:.1}.",
        evaluated, total, failed, average_score
    );

    if let Some(finding) = top_findings.first() {
        narrative.push_str(&format!(
            " Most frequent finding: \"{}\" ({} calls).",
            finding.text, finding.count
        ));
    }

    if top_critical.is_empty() {
        if evaluated > 0 {
            narrative.push_str(" No critical attribute failed.");
        }
    } else {
        let names: Vec<&str> = top_critical.iter().map(|e| e.text.as_str()).collect();
        narrative.push_str(&format!(
            " Critical attributes affected: {}.",
            names.join(", ")
        ));
    }

    narrative
}
