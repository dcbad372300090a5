//! Applicability Resolution Integration Tests
//!
//! End-to-end runs of evidence extraction, applicability resolution and
//! scoring over transcripts, verifying that undetected behaviors never
//! count against the score.

use callscope::domain::{ComplianceMatrix, MatrixAttribute};
use callscope::evidence::{extract_evidence, SignalLexicon};
use callscope::scoring::{resolve_applicability, RoleKeywords, ScoringPolicy};
use callscope::{score, AttributeVerdict};

fn matrix() -> ComplianceMatrix {
    ComplianceMatrix::new(vec![
        MatrixAttribute {
            name: "Saludo institucional".to_string(),
            category: "Apertura".to_string(),
            weight: 10.0,
        },
        MatrixAttribute {
            name: "Manejo de objeciones".to_string(),
            category: "Negociación".to_string(),
            weight: 20.0,
        },
        MatrixAttribute {
            name: "Confirmación de la negociación".to_string(),
            category: "Negociación".to_string(),
            weight: 100.0,
        },
        MatrixAttribute {
            name: "Solicita consentimiento de contacto".to_string(),
            category: "Cierre".to_string(),
            weight: 15.0,
        },
    ])
}

/// The collaborator dutifully grades everything as applicable-but-failed.
fn all_failed() -> Vec<AttributeVerdict> {
    matrix()
        .attributes
        .iter()
        .map(|a| AttributeVerdict::judged(&a.name, false, "not observed"))
        .collect()
}

fn resolve_and_score(transcript: &str, strict: bool) -> callscope::ScoreResult {
    let matrix = matrix();
    let evidence = extract_evidence(transcript, &SignalLexicon::default());
    let policy = if strict {
        ScoringPolicy::strict()
    } else {
        ScoringPolicy::default()
    };
    let verdicts = resolve_applicability(
        &matrix,
        &all_failed(),
        &evidence,
        policy.strict_mode,
        &RoleKeywords::default(),
    );
    score(&matrix, &verdicts, &policy)
}

#[test]
fn test_call_without_negotiation_cannot_lose_negotiation_points() {
    // No closed deal, no objection, no consent request in the text: only
    // the greeting attribute can deduct.
    let result = resolve_and_score("Hola, le llamo del banco por su cuenta.", false);

    assert_eq!(result.total_deduction, 10.0);
    assert_eq!(result.final_score, 90.0);
    assert!(result.critical_clean());
}

#[test]
fn test_closed_deal_exposes_negotiation_attributes() {
    let closed = "Buenos días, le llamo del banco. No puedo pagar todo, dice \
        usted; entiendo. Entonces quedamos en que realizará el pago de $800 \
        pesos el lunes por transferencia.";
    let result = resolve_and_score(closed, false);

    // Greeting, objection handling and the critical closure attribute all
    // apply and were judged unfulfilled; consent still gated NA.
    assert_eq!(result.total_deduction, 130.0);
    assert_eq!(result.final_score, 0.0);
    assert!(!result.critical_clean());
}

#[test]
fn test_whatsapp_deflection_neutralizes_conversation_attributes() {
    let deflected = "Hola, le llamo del banco. No puedo pagar este mes. \
        Seguimos por mensaje, le mando la información por WhatsApp.";
    let result = resolve_and_score(deflected, false);

    // Objection is present in the text, but the deflection rule still
    // forces objection handling NA; only the greeting deducts.
    assert_eq!(result.total_deduction, 10.0);
    assert!(result.critical_clean());
}

#[test]
fn test_strict_mode_is_na_heavy_but_never_harsher() {
    let text = "Hola, le llamo del banco por su cuenta.";
    let lenient = resolve_and_score(text, false);
    let strict = resolve_and_score(text, true);

    assert!(strict.final_score >= lenient.final_score);
}

#[test]
fn test_forced_na_overrides_preserve_collaborator_justification() {
    let matrix = matrix();
    let claimed = vec![AttributeVerdict::judged(
        "Confirmación de la negociación",
        true,
        "agent recapped the deal",
    )];
    let evidence = extract_evidence("Hola, buenas tardes.", &SignalLexicon::default());

    let verdicts = resolve_applicability(
        &matrix,
        &claimed,
        &evidence,
        false,
        &RoleKeywords::default(),
    );

    let closure = verdicts
        .iter()
        .find(|v| v.attribute == "Confirmación de la negociación")
        .unwrap();
    assert!(!closure.applies);
    assert!(closure.justification.contains("agent recapped the deal"));
    assert!(closure.justification.contains("overridden"));
}
