//! Applicability resolution.
//!
//! The analysis collaborator's applicability claims are untrusted: it will
//! happily grade a "confirm the negotiation" attribute on a call where no
//! negotiation ever closed. This resolver overrides those claims with the
//! deterministic evidence signals, producing one finalized verdict per
//! matrix attribute (plus pass-through informational verdicts for anything
//! the collaborator reported that the matrix does not contain).
//!
//! Rule precedence, first match wins per attribute:
//! 1. channel deflection: negotiation not closed but handed off to a
//!    messaging channel → closure, objection and consent attributes are NA
//!    (a deflected call structurally cannot exhibit those behaviors)
//! 2. reminder-only call → closure and consent attributes are NA unless
//!    independently evidenced
//! 3. per-role evidence gate: closure / objection / consent / full-script
//!    attributes are NA when their activating signal is absent
//! 4. strict mode: anything the collaborator did not explicitly mark
//!    `applies = true` is NA
//! 5. otherwise adopt the collaborator's verdict (or a default-applies
//!    placeholder when it reported none, leaving fulfillment to the
//!    engine's fallback policy)
//!
//! Every returned verdict satisfies the `fulfilled`-iff-`applies` invariant;
//! forced-NA verdicts always carry a generated justification.

use std::collections::HashSet;

use crate::domain::{AttributeVerdict, ComplianceMatrix};
use crate::evidence::{normalized_key, EvidenceSignals};

use super::roles::{classify, AttributeRole, RoleKeywords};

/// Justification attached by strict mode when applicability was not
/// explicitly claimed.
pub const STRICT_NA_JUSTIFICATION: &str = "insufficient explicit evidence under strict policy";

/// Resolve final applicability for every matrix attribute.
pub fn resolve_applicability(
    matrix: &ComplianceMatrix,
    collaborator: &[AttributeVerdict],
    evidence: &EvidenceSignals,
    strict_mode: bool,
    keywords: &RoleKeywords,
) -> Vec<AttributeVerdict> {
    let mut resolved = Vec::with_capacity(collaborator.len().max(matrix.len()));
    let mut matrix_keys: HashSet<String> = HashSet::with_capacity(matrix.len());

    for attr in &matrix.attributes {
        matrix_keys.insert(attr.key());
        let role = classify(&attr.name, keywords);
        let claimed = find_verdict(collaborator, &attr.key());
        resolved.push(resolve_one(&attr.name, role, claimed, evidence, strict_mode));
    }

    // Verdicts with no matrix counterpart are kept (normalized) so
    // diagnostic information is never silently dropped. Ones claiming
    // applicability without a fulfillment demote to NA: the engine's
    // fallback never runs for them, and callers must only ever see Ok
    // verdicts with a boolean fulfillment.
    for verdict in collaborator {
        if !matrix_keys.contains(&normalized_key(&verdict.attribute)) {
            let mut extra = verdict.clone();
            extra.normalize();
            extra.demote_unfulfilled();
            resolved.push(extra);
        }
    }

    debug_assert!(resolved.iter().all(|v| v.is_well_formed()));
    resolved
}

fn find_verdict<'a>(verdicts: &'a [AttributeVerdict], key: &str) -> Option<&'a AttributeVerdict> {
    verdicts.iter().find(|v| normalized_key(&v.attribute) == key)
}

fn resolve_one(
    name: &str,
    role: AttributeRole,
    claimed: Option<&AttributeVerdict>,
    evidence: &EvidenceSignals,
    strict_mode: bool,
) -> AttributeVerdict {
    // Rule 1: deflection to a messaging channel without a closed deal.
    if evidence.whatsapp_continuation && !evidence.negotiation_closed {
        match role {
            AttributeRole::NegotiationClosure
            | AttributeRole::ObjectionHandling
            | AttributeRole::ConsentRequest => {
                return forced_na(
                    name,
                    claimed,
                    "call was deflected to a messaging channel before a negotiation could close",
                );
            }
            _ => {}
        }
    }

    // Rule 2: reminder-only calls, unless the behavior is independently
    // evidenced anyway.
    if evidence.reminder_call {
        match role {
            AttributeRole::NegotiationClosure if !evidence.negotiation_closed => {
                return forced_na(name, claimed, "reminder-only call with no closed negotiation");
            }
            AttributeRole::ConsentRequest if !evidence.consent_requested => {
                return forced_na(name, claimed, "reminder-only call with no consent request");
            }
            _ => {}
        }
    }

    // Rule 3: per-role evidence gates.
    let gate = match role {
        AttributeRole::NegotiationClosure if !evidence.negotiation_closed => {
            Some("no closed negotiation detected in the transcript")
        }
        AttributeRole::ObjectionHandling if !evidence.objection_present => {
            Some("no customer objection detected in the transcript")
        }
        AttributeRole::ConsentRequest if !evidence.consent_requested => {
            Some("no contact-consent request detected in the transcript")
        }
        AttributeRole::ScriptAdherence if !evidence.full_script_followed => {
            Some("full campaign script not detected in the transcript")
        }
        _ => None,
    };
    if let Some(reason) = gate {
        return forced_na(name, claimed, reason);
    }

    // Rule 4: strict mode inverts default-applies to default-NA.
    if strict_mode && !claimed.map(|v| v.applies).unwrap_or(false) {
        return AttributeVerdict::not_applicable(name, STRICT_NA_JUSTIFICATION);
    }

    // Rule 5: adopt the collaborator's verdict.
    match claimed {
        Some(verdict) => {
            let mut adopted = verdict.clone();
            adopted.attribute = name.to_string();
            adopted.normalize();
            adopted
        }
        // No verdict reported: default-applies with no fulfillment; the
        // scoring engine's fallback policy decides what that means.
        None => {
            let mut placeholder = AttributeVerdict {
                attribute: name.to_string(),
                applies: true,
                status: crate::domain::VerdictStatus::Ok,
                fulfilled: None,
                justification: String::new(),
                improvement: None,
            };
            placeholder.normalize();
            placeholder
        }
    }
}

/// Build a forced-NA verdict, preserving any collaborator justification and
/// appending the deterministic reason.
fn forced_na(name: &str, claimed: Option<&AttributeVerdict>, reason: &str) -> AttributeVerdict {
    let justification = match claimed {
        Some(v) if !v.justification.trim().is_empty() => {
            format!("{} (overridden: {})", v.justification.trim(), reason)
        }
        _ => format!("not applicable: {}", reason),
    };
    AttributeVerdict::not_applicable(name, justification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatrixAttribute, VerdictStatus};

    fn matrix(names: &[&str]) -> ComplianceMatrix {
        ComplianceMatrix::new(
            names
                .iter()
                .map(|n| MatrixAttribute {
                    name: n.to_string(),
                    category: "General".to_string(),
                    weight: 20.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_evidence_overrides_collaborator_claim() {
        let matrix = matrix(&["Confirmación de la negociación"]);
        let claimed = vec![AttributeVerdict::judged(
            "Confirmacion de la negociacion",
            true,
            "agent confirmed the deal",
        )];
        let evidence = EvidenceSignals::default(); // negotiation_closed = false

        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &evidence,
            false,
            &RoleKeywords::default(),
        );

        assert_eq!(resolved.len(), 1);
        assert!(!resolved[0].applies);
        assert_eq!(resolved[0].status, VerdictStatus::NotApplicable);
        assert_eq!(resolved[0].fulfilled, None);
        assert!(resolved[0].justification.contains("overridden"));
    }

    #[test]
    fn test_deflection_overrides_present_objection() {
        let matrix = matrix(&["Manejo de objeciones"]);
        let claimed = vec![AttributeVerdict::judged("Manejo de objeciones", true, "")];
        // Objection is present, which would pass the role gate, but the call
        // was deflected without closing.
        let evidence = EvidenceSignals {
            objection_present: true,
            whatsapp_continuation: true,
            negotiation_closed: false,
            ..Default::default()
        };

        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &evidence,
            false,
            &RoleKeywords::default(),
        );
        assert!(!resolved[0].applies);
    }

    #[test]
    fn test_reminder_call_spares_independently_evidenced_consent() {
        let matrix = matrix(&["Solicita consentimiento de contacto"]);
        let claimed = vec![AttributeVerdict::judged(
            "Solicita consentimiento de contacto",
            true,
            "asked for permission",
        )];
        let evidence = EvidenceSignals {
            reminder_call: true,
            consent_requested: true,
            ..Default::default()
        };

        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &evidence,
            false,
            &RoleKeywords::default(),
        );
        assert!(resolved[0].applies);
        assert_eq!(resolved[0].fulfilled, Some(true));
    }

    #[test]
    fn test_strict_mode_defaults_unclaimed_to_na() {
        let matrix = matrix(&["Despedida cordial"]);
        let evidence = EvidenceSignals::default();

        // Collaborator reported nothing for the attribute.
        let resolved =
            resolve_applicability(&matrix, &[], &evidence, true, &RoleKeywords::default());
        assert!(!resolved[0].applies);
        assert_eq!(resolved[0].justification, STRICT_NA_JUSTIFICATION);

        // Non-strict: default-applies placeholder.
        let resolved =
            resolve_applicability(&matrix, &[], &evidence, false, &RoleKeywords::default());
        assert!(resolved[0].applies);
        assert_eq!(resolved[0].fulfilled, None);
    }

    #[test]
    fn test_extra_collaborator_verdicts_pass_through() {
        let matrix = matrix(&["Despedida cordial"]);
        let claimed = vec![
            AttributeVerdict::judged("Despedida cordial", true, ""),
            AttributeVerdict::judged("Tono de voz", false, "monotone delivery"),
        ];
        let evidence = EvidenceSignals::default();

        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &evidence,
            false,
            &RoleKeywords::default(),
        );
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].attribute, "Tono de voz");
        assert!(resolved[1].is_well_formed());
    }

    #[test]
    fn test_unfulfilled_extra_verdict_demotes_to_na() {
        let matrix = matrix(&["Despedida cordial"]);
        let mut extra = AttributeVerdict::judged("Tono de voz", true, "");
        extra.fulfilled = None;
        let evidence = EvidenceSignals::default();

        let resolved = resolve_applicability(
            &matrix,
            &[extra],
            &evidence,
            false,
            &RoleKeywords::default(),
        );

        let tono = resolved
            .iter()
            .find(|v| v.attribute == "Tono de voz")
            .unwrap();
        assert_eq!(tono.status, VerdictStatus::NotApplicable);
        assert!(!tono.applies);
        assert_eq!(tono.fulfilled, None);
        assert!(!tono.justification.is_empty());
    }

    #[test]
    fn test_script_adherence_gate() {
        let matrix = matrix(&["Apego al guión completo"]);
        let claimed = vec![AttributeVerdict::judged("Apego al guion completo", true, "")];

        let not_followed = EvidenceSignals::default();
        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &not_followed,
            false,
            &RoleKeywords::default(),
        );
        assert!(!resolved[0].applies);

        let followed = EvidenceSignals {
            full_script_followed: true,
            ..Default::default()
        };
        let resolved = resolve_applicability(
            &matrix,
            &claimed,
            &followed,
            false,
            &RoleKeywords::default(),
        );
        assert!(resolved[0].applies);
    }
}
