//! Whisper transcription backend.
//!
//! Shells out to a local whisper binary and parses its JSON output.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use super::{Transcriber, Transcript, TranscriptSegment};

/// Subprocess transcriber driving a local Whisper install.
pub struct WhisperTranscriber {
    binary_path: String,
    model: String,
}

impl Default for WhisperTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl WhisperTranscriber {
    /// Create a transcriber using `WHISPER_PATH` or the default binary name.
    pub fn new() -> Self {
        let binary_path =
            std::env::var("WHISPER_PATH").unwrap_or_else(|_| "whisper".to_string());
        Self {
            binary_path,
            model: "base".to_string(),
        }
    }

    /// Create a transcriber with explicit binary and model.
    pub fn with_settings(binary_path: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            model: model.into(),
        }
    }
}

/// Whisper output JSON structure
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, audio_path: &Path, language: &str) -> Result<Transcript> {
        let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;

        let output = Command::new(&self.binary_path)
            .arg(audio_path)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_dir")
            .arg(temp_dir.path())
            .arg("--output_format")
            .arg("json")
            .arg("--language")
            .arg(language)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to run whisper")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Whisper failed: {}", stderr.trim());
        }

        // Whisper writes <stem>.json into the output directory
        let stem = audio_path.file_stem().unwrap_or_default().to_string_lossy();
        let json_path = temp_dir.path().join(format!("{}.json", stem));

        let json_content = tokio::fs::read_to_string(&json_path)
            .await
            .context("Failed to read whisper output")?;

        let whisper: WhisperOutput =
            serde_json::from_str(&json_content).context("Failed to parse whisper JSON")?;

        let duration = whisper.segments.last().map(|s| s.end).unwrap_or(0.0);

        Ok(Transcript {
            text: whisper.text.trim().to_string(),
            language: if whisper.language.is_empty() {
                language.to_string()
            } else {
                whisper.language
            },
            duration_seconds: duration,
            segments: whisper
                .segments
                .into_iter()
                .map(|s| TranscriptSegment {
                    start: s.start,
                    end: s.end,
                    text: s.text.trim().to_string(),
                    speaker: None,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcriber_name() {
        let t = WhisperTranscriber::with_settings("/usr/local/bin/whisper", "small");
        assert_eq!(t.name(), "whisper");
        assert_eq!(t.binary_path, "/usr/local/bin/whisper");
        assert_eq!(t.model, "small");
    }

    #[test]
    fn test_output_parsing() {
        let json = r#"{
            "text": " Buenos días, le llamo de cobranza. ",
            "language": "es",
            "segments": [
                {"start": 0.0, "end": 3.2, "text": " Buenos días,"},
                {"start": 3.2, "end": 6.0, "text": " le llamo de cobranza."}
            ]
        }"#;
        let parsed: WhisperOutput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.language, "es");
        assert_eq!(parsed.segments.len(), 2);
        assert_eq!(parsed.segments.last().unwrap().end, 6.0);
    }
}
