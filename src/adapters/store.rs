//! Evaluation record persistence.
//!
//! Finished evaluations are written as pretty-printed JSON under
//! `<home>/evaluations/<id>/record.json` so audits can be re-read and
//! compared later without re-running the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::EvaluationOutcome;

/// File-backed store for evaluation outcomes.
pub struct EvaluationStore {
    root: PathBuf,
}

impl EvaluationStore {
    /// Create a store rooted at `<home>/evaluations`.
    pub fn new(home: &Path) -> Self {
        Self {
            root: home.join("evaluations"),
        }
    }

    /// Persist an outcome, returning the record path.
    pub fn save(&self, outcome: &EvaluationOutcome) -> Result<PathBuf> {
        let id = record_id(outcome);
        let dir = self.root.join(&id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create record dir: {}", dir.display()))?;

        let path = dir.join("record.json");
        let json = serde_json::to_string_pretty(outcome)
            .context("Failed to serialize evaluation record")?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write record: {}", path.display()))?;

        info!(id = %id, path = %path.display(), "Saved evaluation record");
        Ok(path)
    }

    /// Load a previously saved outcome by record id.
    pub fn load(&self, id: &str) -> Result<EvaluationOutcome> {
        let path = self.root.join(id).join("record.json");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("No evaluation record: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt evaluation record: {}", path.display()))
    }

    /// List all record ids, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read store: {}", self.root.display()))
            }
        };
        for entry in entries {
            let entry = entry.context("Failed to read store entry")?;
            if entry.path().join("record.json").is_file() {
                ids.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Stable record id: slugified name plus the audio hash when present.
fn record_id(outcome: &EvaluationOutcome) -> String {
    let slug = slugify(&outcome.name);
    match &outcome.audio_hash {
        Some(hash) => format!("{}-{}", slug, hash),
        None => slug,
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "evaluation".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Short content hash of a file (first 12 hex chars of SHA-256), used to
/// identify audio inputs across re-runs.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let content =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let digest = hasher.finalize();
    Ok(hex::encode(digest)[..12].to_string())
}
