//! Semantic role classification for matrix attributes.
//!
//! The forced-NA rules key off what an attribute is *about*, not its exact
//! name. Classification is case/accent-insensitive substring matching
//! against configurable keyword sets, so "Confirmación de la negociación"
//! and "confirmacion de negociacion" land on the same role. The matching is
//! intentionally approximate; anything unmatched is `Other` and only the
//! collaborator's own claim decides it.

use serde::{Deserialize, Serialize};

use crate::evidence::{contains_any, normalize};

/// What a matrix attribute is semantically asking the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeRole {
    /// Confirm the closed negotiation (amount, date, channel recap)
    NegotiationClosure,
    /// Handle a debtor objection
    ObjectionHandling,
    /// Request cross-channel contact consent
    ConsentRequest,
    /// Follow the full campaign script
    ScriptAdherence,
    /// No deterministic rule applies
    Other,
}

/// Keyword sets mapping attribute names to roles.
///
/// Entries must be lowercase and accent-free (they are matched against
/// normalized names).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleKeywords {
    pub negotiation_closure: Vec<String>,
    pub objection_handling: Vec<String>,
    pub consent_request: Vec<String>,
    pub script_adherence: Vec<String>,
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RoleKeywords {
    fn default() -> Self {
        Self {
            negotiation_closure: phrases(&[
                "confirmacion de la negociacion",
                "confirmacion de negociacion",
                "cierre de la negociacion",
                "cierre de negociacion",
                "confirma el acuerdo",
                "confirmacion del acuerdo",
            ]),
            objection_handling: phrases(&[
                "objecion",
                "manejo de objeciones",
                "rebate",
                "rebatir",
            ]),
            consent_request: phrases(&[
                "consentimiento",
                "autorizacion de contacto",
                "contacto por whatsapp",
                "contacto por otros medios",
                "envio de informacion",
            ]),
            script_adherence: phrases(&[
                "guion completo",
                "guion de la campana",
                "script completo",
                "speech completo",
                "apego al guion",
                "apego al script",
            ]),
        }
    }
}

/// Classify an attribute name into its semantic role.
///
/// First matching role wins, checked in the order closure → objection →
/// consent → script. Role sets rarely overlap in practice; the fixed order
/// keeps classification deterministic when they do.
pub fn classify(attribute_name: &str, keywords: &RoleKeywords) -> AttributeRole {
    let name = normalize(attribute_name);

    if contains_any(&name, &keywords.negotiation_closure) {
        AttributeRole::NegotiationClosure
    } else if contains_any(&name, &keywords.objection_handling) {
        AttributeRole::ObjectionHandling
    } else if contains_any(&name, &keywords.consent_request) {
        AttributeRole::ConsentRequest
    } else if contains_any(&name, &keywords.script_adherence) {
        AttributeRole::ScriptAdherence
    } else {
        AttributeRole::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_variants_classify_equally() {
        let kw = RoleKeywords::default();
        assert_eq!(
            classify("Confirmación de la negociación", &kw),
            AttributeRole::NegotiationClosure
        );
        assert_eq!(
            classify("confirmacion de la negociacion", &kw),
            AttributeRole::NegotiationClosure
        );
    }

    #[test]
    fn test_each_role() {
        let kw = RoleKeywords::default();
        assert_eq!(
            classify("Manejo de objeciones del cliente", &kw),
            AttributeRole::ObjectionHandling
        );
        assert_eq!(
            classify("Solicita consentimiento de contacto", &kw),
            AttributeRole::ConsentRequest
        );
        assert_eq!(
            classify("Apego al guión completo", &kw),
            AttributeRole::ScriptAdherence
        );
        assert_eq!(classify("Despedida cordial", &kw), AttributeRole::Other);
    }

    #[test]
    fn test_custom_keywords() {
        let kw = RoleKeywords {
            consent_request: vec!["permiso de contacto".to_string()],
            ..RoleKeywords::default()
        };
        assert_eq!(
            classify("Pide permiso de contacto", &kw),
            AttributeRole::ConsentRequest
        );
    }
}
