//! Deterministic textual evidence extraction.
//!
//! The extractor turns a raw transcript into a flat record of boolean
//! signals (negotiation closed, objection raised, consent requested, ...)
//! that the applicability resolver uses to override the analysis
//! collaborator's claims. Everything here is pure, synchronous and
//! deterministic: same text in, same signals out.

pub mod normalize;
pub mod signals;

pub use normalize::{contains_any, normalize, normalized_key};
pub use signals::{extract_evidence, EvidenceSignals, SignalLexicon};
