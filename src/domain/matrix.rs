//! Compliance matrix types.
//!
//! A matrix is the list of weighted criteria one evaluation is scored
//! against. It is immutable for the duration of an evaluation; the scoring
//! engine iterates it in load order so output ordering never depends on the
//! analysis collaborator's response ordering.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evidence::normalized_key;

/// Default weight at/above which an attribute counts as critical.
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 100.0;

/// One compliance criterion row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixAttribute {
    /// Unique name (matched case/accent-insensitively)
    pub name: String,

    /// Category used for roll-up reporting
    #[serde(default)]
    pub category: String,

    /// Non-negative deduction weight
    pub weight: f64,
}

impl MatrixAttribute {
    /// Normalized lookup key for this attribute's name.
    pub fn key(&self) -> String {
        normalized_key(&self.name)
    }

    /// An attribute is critical when its weight meets the threshold.
    pub fn is_critical(&self, threshold: f64) -> bool {
        self.weight >= threshold
    }
}

/// The full compliance matrix for one evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceMatrix {
    pub attributes: Vec<MatrixAttribute>,
}

/// Matrix validation errors
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Matrix has no attributes")]
    Empty,

    #[error("Attribute {index} has an empty name")]
    EmptyName { index: usize },

    #[error("Attribute '{name}' has negative weight {weight}")]
    NegativeWeight { name: String, weight: f64 },

    #[error("Duplicate attribute name: '{name}'")]
    DuplicateName { name: String },
}

impl ComplianceMatrix {
    pub fn new(attributes: Vec<MatrixAttribute>) -> Self {
        Self { attributes }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Find an attribute by normalized name.
    pub fn get(&self, name: &str) -> Option<&MatrixAttribute> {
        let key = normalized_key(name);
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Validate shape: non-empty, named, non-negative weights, unique
    /// normalized names.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.attributes.is_empty() {
            return Err(MatrixError::Empty);
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.attributes.len());
        for (index, attr) in self.attributes.iter().enumerate() {
            if attr.name.trim().is_empty() {
                return Err(MatrixError::EmptyName { index });
            }
            if attr.weight < 0.0 {
                return Err(MatrixError::NegativeWeight {
                    name: attr.name.clone(),
                    weight: attr.weight,
                });
            }
            let key = attr.key();
            if seen.contains(&key) {
                return Err(MatrixError::DuplicateName {
                    name: attr.name.clone(),
                });
            }
            seen.push(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, weight: f64) -> MatrixAttribute {
        MatrixAttribute {
            name: name.to_string(),
            category: "General".to_string(),
            weight,
        }
    }

    #[test]
    fn test_critical_threshold() {
        let a = attr("Identificación", 100.0);
        assert!(a.is_critical(DEFAULT_CRITICAL_THRESHOLD));
        let b = attr("Despedida", 10.0);
        assert!(!b.is_critical(DEFAULT_CRITICAL_THRESHOLD));
    }

    #[test]
    fn test_lookup_is_accent_insensitive() {
        let matrix = ComplianceMatrix::new(vec![attr("Confirmación de la negociación", 30.0)]);
        assert!(matrix.get("confirmacion de la negociacion").is_some());
        assert!(matrix.get("CONFIRMACIÓN DE LA NEGOCIACIÓN").is_some());
        assert!(matrix.get("otra cosa").is_none());
    }

    #[test]
    fn test_validation_rejects_duplicates_and_negatives() {
        let matrix = ComplianceMatrix::new(vec![attr("A", 10.0), attr("á", 5.0)]);
        assert!(matches!(
            matrix.validate(),
            Err(MatrixError::DuplicateName { .. })
        ));

        let matrix = ComplianceMatrix::new(vec![attr("A", -1.0)]);
        assert!(matches!(
            matrix.validate(),
            Err(MatrixError::NegativeWeight { .. })
        ));

        assert!(matches!(
            ComplianceMatrix::default().validate(),
            Err(MatrixError::Empty)
        ));
    }
}
