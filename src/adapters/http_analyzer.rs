//! HTTP analysis collaborator.
//!
//! Posts the transcript and the compliance matrix to a chat-completion
//! style endpoint and parses the model's JSON answer into an
//! `AnalysisReport`. The response is treated as untrusted text: code fences
//! are stripped, the first JSON object is located by brace matching, and
//! every report field defaults on absence. Anything unparseable becomes an
//! empty report rather than an error; the resolver and scoring engine
//! carry the fallback policy from there.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{AnalysisReport, ComplianceMatrix};

use super::{Analyzer, Transcript};

/// Configuration for the HTTP analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            model: "llama3".to_string(),
            api_key_env: "CALLSCOPE_API_KEY".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Chat-completion client for per-attribute analysis.
pub struct HttpAnalyzer {
    settings: AnalyzerSettings,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

impl HttpAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    /// Build the judging prompt: one line per matrix attribute plus the
    /// expected JSON shape.
    fn build_prompt(transcript: &Transcript, matrix: &ComplianceMatrix, context: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(
            "Evalúa la siguiente llamada de cobranza contra cada atributo de la matriz. \
             Responde únicamente con JSON: {\"verdicts\":[{\"attribute\",\"applies\",\
             \"fulfilled\",\"justification\",\"improvement\"}],\"findings\":[],\
             \"recommendations\":[]}.\n\n",
        );
        if !context.trim().is_empty() {
            prompt.push_str("Contexto: ");
            prompt.push_str(context.trim());
            prompt.push_str("\n\n");
        }
        prompt.push_str("Atributos:\n");
        for attr in &matrix.attributes {
            prompt.push_str(&format!(
                "- {} (categoría: {}, peso: {})\n",
                attr.name, attr.category, attr.weight
            ));
        }
        prompt.push_str("\nTranscripción:\n");
        prompt.push_str(&transcript.text);
        prompt
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    fn name(&self) -> &str {
        "http"
    }

    async fn analyze(
        &self,
        transcript: &Transcript,
        matrix: &ComplianceMatrix,
        context: &str,
    ) -> Result<AnalysisReport> {
        let prompt = Self::build_prompt(transcript, matrix, context);

        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let mut builder = self
            .client
            .post(&self.settings.endpoint)
            .timeout(Duration::from_secs(self.settings.timeout_seconds))
            .json(&request);

        if let Ok(token) = std::env::var(&self.settings.api_key_env) {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .context("Failed to reach analysis endpoint")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Analysis endpoint error ({}): {}", status, text.trim());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Analysis endpoint returned non-JSON body")?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        Ok(parse_report(content))
    }
}

/// Extract an `AnalysisReport` from untrusted model output.
///
/// Never fails: malformed output degrades to an empty report and the
/// downstream fallback policies take over.
pub fn parse_report(content: &str) -> AnalysisReport {
    let candidate = extract_json_object(content).unwrap_or(content);

    match serde_json::from_str::<AnalysisReport>(candidate) {
        Ok(report) => {
            debug!(verdicts = report.verdicts.len(), "Parsed analysis report");
            report
        }
        Err(e) => {
            warn!(error = %e, "Analysis output unparseable, using empty report");
            AnalysisReport::default()
        }
    }
}

/// Locate the first balanced JSON object in free text (models like to wrap
/// answers in prose or ``` fences).
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
