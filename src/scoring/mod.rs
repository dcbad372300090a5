//! Deterministic applicability resolution and weighted scoring.
//!
//! This module contains:
//! - Roles: semantic classification of matrix attribute names
//! - Applicability: evidence-driven forced-NA resolution over the
//!   collaborator's untrusted claims
//! - Engine: weighted deductions, category roll-ups and policy fallbacks

pub mod applicability;
pub mod engine;
pub mod roles;

// Re-export commonly used items
pub use applicability::{resolve_applicability, STRICT_NA_JUSTIFICATION};
pub use engine::{score, ScoringPolicy};
pub use roles::{classify, AttributeRole, RoleKeywords};
