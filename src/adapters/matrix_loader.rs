//! Compliance matrix loading.
//!
//! Matrices arrive as CSV, YAML or JSON files; the format is picked from
//! the file extension. Every loaded matrix is validated before use.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::domain::{ComplianceMatrix, MatrixAttribute};

/// Load and validate a compliance matrix from disk.
pub fn load_matrix(path: &Path) -> Result<ComplianceMatrix> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    let matrix = match extension.as_str() {
        "csv" => load_csv(path)?,
        "yaml" | "yml" => load_yaml(path)?,
        "json" => load_json(path)?,
        other => anyhow::bail!(
            "Unsupported matrix format '{}' (expected csv, yaml or json): {}",
            other,
            path.display()
        ),
    };

    matrix
        .validate()
        .with_context(|| format!("Invalid matrix: {}", path.display()))?;

    info!(
        path = %path.display(),
        attributes = matrix.len(),
        "Loaded compliance matrix"
    );
    Ok(matrix)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(default)]
    category: String,
    weight: f64,
}

fn load_csv(path: &Path) -> Result<ComplianceMatrix> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open matrix CSV: {}", path.display()))?;

    let mut attributes = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.with_context(|| format!("Bad matrix row {} in {}", i + 2, path.display()))?;
        attributes.push(MatrixAttribute {
            name: row.name,
            category: row.category,
            weight: row.weight,
        });
    }

    Ok(ComplianceMatrix::new(attributes))
}

/// Accepts either a bare attribute list or a `{ attributes: [...] }` document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatrixDocument {
    Wrapped { attributes: Vec<MatrixAttribute> },
    Bare(Vec<MatrixAttribute>),
}

impl MatrixDocument {
    fn into_matrix(self) -> ComplianceMatrix {
        match self {
            Self::Wrapped { attributes } | Self::Bare(attributes) => {
                ComplianceMatrix::new(attributes)
            }
        }
    }
}

fn load_yaml(path: &Path) -> Result<ComplianceMatrix> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file: {}", path.display()))?;
    let doc: MatrixDocument = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse matrix YAML: {}", path.display()))?;
    Ok(doc.into_matrix())
}

fn load_json(path: &Path) -> Result<ComplianceMatrix> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read matrix file: {}", path.display()))?;
    let doc: MatrixDocument = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse matrix JSON: {}", path.display()))?;
    Ok(doc.into_matrix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_matrix() {
        let file = write_temp(
            ".csv",
            "name,category,weight\n\
             Saludo institucional,Apertura,10\n\
             Confirmación de la negociación,Negociación,100\n",
        );
        let matrix = load_matrix(file.path()).unwrap();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.attributes[1].weight, 100.0);
        assert_eq!(matrix.attributes[0].category, "Apertura");
    }

    #[test]
    fn test_load_yaml_matrix_wrapped() {
        let file = write_temp(
            ".yaml",
            "attributes:\n\
             - name: Saludo institucional\n\
             \x20 category: Apertura\n\
             \x20 weight: 10\n",
        );
        let matrix = load_matrix(file.path()).unwrap();
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn test_load_json_bare_list() {
        let file = write_temp(
            ".json",
            r#"[{"name":"Despedida cordial","category":"Cierre","weight":5}]"#,
        );
        let matrix = load_matrix(file.path()).unwrap();
        assert_eq!(matrix.attributes[0].name, "Despedida cordial");
    }

    #[test]
    fn test_invalid_matrix_rejected() {
        let file = write_temp(".json", r#"[{"name":"","weight":5}]"#);
        assert!(load_matrix(file.path()).is_err());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = write_temp(".toml", "name = 1");
        let err = load_matrix(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported matrix format"));
    }
}
