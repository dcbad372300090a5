//! Deterministic evidence signals derived from a transcript.
//!
//! Each signal is a boolean fact computed once per transcript by pure
//! keyword tests over normalized text. Signals are independent: no signal
//! short-circuits another, and the same text always yields the same output.
//!
//! The composite signals are intentionally conservative. A closed
//! negotiation requires an amount, a temporal reference, a payment channel
//! and a recap phrase to all co-occur; partial negotiation talk never counts
//! as a closed deal.

use serde::{Deserialize, Serialize};

use super::normalize::{contains_any, has_digit, normalize};

/// Flat record of text-derived boolean facts about one transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSignals {
    /// Amount + date + payment channel + recap phrase all present
    pub negotiation_closed: bool,
    /// Debtor raised an objection or refusal
    pub objection_present: bool,
    /// Call deflected to a messaging channel (e.g. WhatsApp)
    pub whatsapp_continuation: bool,
    /// Agent asked a probing question about the situation
    pub probing_question: bool,
    /// Recording disclosure was given
    pub recording_disclosed: bool,
    /// Payment alternatives were offered
    pub alternatives_offered: bool,
    /// Benefits of paying / consequences of not paying were stated
    pub benefits_consequences: bool,
    /// Cross-channel contact consent was requested
    pub consent_requested: bool,
    /// Greeting + disclosure + alternatives + (closure or objection)
    pub full_script_followed: bool,
    /// Call was a payment reminder only
    pub reminder_call: bool,
}

/// Configurable keyword sets behind each signal.
///
/// Phrases are matched as substrings of the normalized transcript, so
/// entries here should themselves be lowercase and accent-free. Defaults
/// cover Spanish collections phrasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalLexicon {
    pub currency: Vec<String>,
    pub temporal: Vec<String>,
    pub payment_channel: Vec<String>,
    pub recap: Vec<String>,
    pub objection: Vec<String>,
    pub whatsapp: Vec<String>,
    pub probing: Vec<String>,
    pub recording: Vec<String>,
    pub alternatives: Vec<String>,
    pub benefits: Vec<String>,
    pub consent: Vec<String>,
    pub greeting: Vec<String>,
    pub reminder: Vec<String>,
}

fn phrases(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SignalLexicon {
    fn default() -> Self {
        Self {
            currency: phrases(&["$", "peso", "sol", "dolar", "monto de", "cuota de", "pago de"]),
            temporal: phrases(&[
                "hoy",
                "manana",
                "pasado manana",
                "lunes",
                "martes",
                "miercoles",
                "jueves",
                "viernes",
                "sabado",
                "domingo",
                "enero",
                "febrero",
                "marzo",
                "abril",
                "mayo",
                "junio",
                "julio",
                "agosto",
                "septiembre",
                "octubre",
                "noviembre",
                "diciembre",
                "quincena",
                "fin de mes",
                "proximo",
                "esta semana",
            ]),
            payment_channel: phrases(&[
                "transferencia",
                "deposito",
                "efectivo",
                "tarjeta",
                "banco",
                "oxxo",
                "ventanilla",
                "corresponsal",
                "aplicacion",
                "pago en linea",
                "portal de pagos",
            ]),
            recap: phrases(&[
                "entonces quedamos",
                "quedamos en que",
                "para confirmar",
                "le confirmo",
                "confirmamos que",
                "recapitulando",
                "en resumen",
            ]),
            objection: phrases(&[
                "no puedo pagar",
                "no tengo dinero",
                "no cuento con",
                "no estoy de acuerdo",
                "ya pague",
                "ya realice el pago",
                "no me interesa",
                "estoy desempleado",
                "me quede sin trabajo",
                "es un error",
                "no reconozco",
            ]),
            whatsapp: phrases(&[
                "whatsapp",
                "le escribo por mensaje",
                "continuamos por el chat",
                "le mando la informacion por mensaje",
                "seguimos por mensaje",
            ]),
            probing: phrases(&[
                "por que",
                "cual es el motivo",
                "que fue lo que paso",
                "a que se debe",
                "me puede comentar",
                "me podria explicar",
            ]),
            recording: phrases(&[
                "esta siendo grabada",
                "sera grabada",
                "grabada por motivos de calidad",
                "grabada por calidad",
                "esta llamada se graba",
            ]),
            alternatives: phrases(&[
                "le puedo ofrecer",
                "tenemos opciones",
                "plan de pagos",
                "convenio",
                "descuento",
                "reestructura",
                "facilidades de pago",
                "otra alternativa",
            ]),
            benefits: phrases(&[
                "beneficio",
                "evitar",
                "buro de credito",
                "intereses",
                "recargo",
                "consecuencia",
                "se le condona",
                "dejara de generar",
            ]),
            consent: phrases(&[
                "me autoriza",
                "nos autoriza",
                "autoriza el envio",
                "acepta recibir",
                "esta de acuerdo en que le contactemos",
                "podemos enviarle informacion",
            ]),
            greeting: phrases(&[
                "buenos dias",
                "buenas tardes",
                "buenas noches",
                "le saluda",
                "mi nombre es",
                "se comunica de",
                "le llamo de",
                "le llamamos de",
            ]),
            reminder: phrases(&[
                "llamada de recordatorio",
                "solo para recordarle",
                "le recordamos que",
                "recordarle su pago",
                "recordatorio de pago",
            ]),
        }
    }
}

/// Extract all evidence signals from a transcript.
///
/// Pure and deterministic: same text and lexicon always produce the same
/// signals. Normalization happens once; every signal is evaluated
/// independently over the normalized text.
pub fn extract_evidence(transcript: &str, lexicon: &SignalLexicon) -> EvidenceSignals {
    let text = normalize(transcript);

    let amount = has_amount(&text, lexicon);
    let temporal = contains_any(&text, &lexicon.temporal);
    let channel = contains_any(&text, &lexicon.payment_channel);
    let recap = contains_any(&text, &lexicon.recap);

    // All four elements must co-occur; any single missing element means no
    // closed negotiation.
    let negotiation_closed = amount && temporal && channel && recap;

    let objection_present = contains_any(&text, &lexicon.objection);
    let whatsapp_continuation = contains_any(&text, &lexicon.whatsapp);
    let probing_question = contains_any(&text, &lexicon.probing);
    let recording_disclosed = contains_any(&text, &lexicon.recording);
    let alternatives_offered = contains_any(&text, &lexicon.alternatives);
    let benefits_consequences = contains_any(&text, &lexicon.benefits);
    let consent_requested = contains_any(&text, &lexicon.consent);
    let reminder_call = contains_any(&text, &lexicon.reminder);

    let greeting = contains_any(&text, &lexicon.greeting);
    let full_script_followed = greeting
        && recording_disclosed
        && alternatives_offered
        && (negotiation_closed || objection_present);

    EvidenceSignals {
        negotiation_closed,
        objection_present,
        whatsapp_continuation,
        probing_question,
        recording_disclosed,
        alternatives_offered,
        benefits_consequences,
        consent_requested,
        full_script_followed,
        reminder_call,
    }
}

/// A monetary amount requires a currency marker; bare digits alone (dates,
/// account numbers) do not count.
fn has_amount(normalized_text: &str, lexicon: &SignalLexicon) -> bool {
    contains_any(normalized_text, &lexicon.currency) && has_digit(normalized_text)
}
