//! Single-call evaluation pipeline.
//!
//! One evaluation is a fixed sequence: transcribe (when starting from
//! audio), analyze with the collaborator, extract deterministic evidence,
//! resolve applicability, score. The collaborator is the only fallible
//! remote step; everything after it is pure and cannot fail.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, instrument};

use crate::adapters::{store::compute_file_hash, Analyzer, Transcriber};
use crate::domain::{ComplianceMatrix, EvaluationOutcome};
use crate::evidence::{extract_evidence, SignalLexicon};
use crate::scoring::{resolve_applicability, score, RoleKeywords, ScoringPolicy};

/// Runs the full pipeline for one call.
pub struct Evaluator {
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn Analyzer>,
    lexicon: SignalLexicon,
    keywords: RoleKeywords,
    policy: ScoringPolicy,
}

impl Evaluator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn Analyzer>,
        lexicon: SignalLexicon,
        keywords: RoleKeywords,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            transcriber,
            analyzer,
            lexicon,
            keywords,
            policy,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Evaluate an audio file: transcribe, then run the transcript pipeline.
    #[instrument(skip(self, matrix, context), fields(audio = %audio_path.display()))]
    pub async fn evaluate_audio(
        &self,
        audio_path: &Path,
        matrix: &ComplianceMatrix,
        context: &str,
        language: &str,
    ) -> Result<EvaluationOutcome> {
        if !audio_path.is_file() {
            anyhow::bail!("Audio file not found: {}", audio_path.display());
        }

        let audio_hash = compute_file_hash(audio_path)
            .with_context(|| format!("Failed to hash audio: {}", audio_path.display()))?;

        let transcript = self
            .transcriber
            .transcribe(audio_path, language)
            .await
            .with_context(|| format!("Transcription failed: {}", audio_path.display()))?;

        info!(
            transcriber = self.transcriber.name(),
            duration = transcript.duration_seconds,
            "Transcription complete"
        );

        let name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| audio_path.display().to_string());

        let mut outcome = self
            .evaluate_transcript(&name, &transcript.text, matrix, context)
            .await?;
        outcome.audio_hash = Some(audio_hash);
        Ok(outcome)
    }

    /// Evaluate an already-transcribed call.
    #[instrument(skip(self, text, matrix, context), fields(name = %name))]
    pub async fn evaluate_transcript(
        &self,
        name: &str,
        text: &str,
        matrix: &ComplianceMatrix,
        context: &str,
    ) -> Result<EvaluationOutcome> {
        matrix.validate().context("Invalid compliance matrix")?;
        if text.trim().is_empty() {
            anyhow::bail!("Transcript is empty: {}", name);
        }

        let transcript = crate::adapters::Transcript::from_text(text);
        let report = self
            .analyzer
            .analyze(&transcript, matrix, context)
            .await
            .with_context(|| format!("Analysis failed: {}", name))?;

        let evidence = extract_evidence(text, &self.lexicon);
        let verdicts = resolve_applicability(
            matrix,
            &report.verdicts,
            &evidence,
            self.policy.strict_mode,
            &self.keywords,
        );
        let score = score(matrix, &verdicts, &self.policy);
        // Callers see the engine-finalized verdicts (fallbacks applied),
        // not the intermediate resolver output.
        let verdicts: Vec<_> = score.per_attribute.iter().map(|s| s.verdict.clone()).collect();

        info!(
            analyzer = self.analyzer.name(),
            final_score = score.final_score,
            critical_clean = score.critical_clean(),
            "Evaluation complete"
        );

        Ok(EvaluationOutcome {
            name: name.to_string(),
            audio_hash: None,
            transcript: text.to_string(),
            evidence,
            verdicts,
            score,
            findings: report.findings,
            recommendations: report.recommendations,
            evaluated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Transcript;
    use crate::domain::{AnalysisReport, AttributeVerdict, MatrixAttribute};
    use async_trait::async_trait;

    struct FixedAnalyzer {
        report: AnalysisReport,
    }

    #[async_trait]
    impl Analyzer for FixedAnalyzer {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn analyze(
            &self,
            _transcript: &Transcript,
            _matrix: &ComplianceMatrix,
            _context: &str,
        ) -> Result<AnalysisReport> {
            Ok(self.report.clone())
        }
    }

    struct NoTranscriber;

    #[async_trait]
    impl Transcriber for NoTranscriber {
        fn name(&self) -> &str {
            "none"
        }
        async fn transcribe(&self, _audio: &Path, _language: &str) -> Result<Transcript> {
            anyhow::bail!("not available in tests")
        }
    }

    fn evaluator(report: AnalysisReport) -> Evaluator {
        Evaluator::new(
            Arc::new(NoTranscriber),
            Arc::new(FixedAnalyzer { report }),
            SignalLexicon::default(),
            RoleKeywords::default(),
            ScoringPolicy::default(),
        )
    }

    fn matrix() -> ComplianceMatrix {
        ComplianceMatrix::new(vec![
            MatrixAttribute {
                name: "Saludo institucional".to_string(),
                category: "Apertura".to_string(),
                weight: 10.0,
            },
            MatrixAttribute {
                name: "Confirmación de la negociación".to_string(),
                category: "Negociación".to_string(),
                weight: 100.0,
            },
        ])
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let ev = evaluator(AnalysisReport::default());
        let err = ev
            .evaluate_transcript("call", "   ", &matrix(), "")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_pipeline_produces_resolved_verdicts_and_score() {
        let report = AnalysisReport {
            verdicts: vec![
                AttributeVerdict::judged("Saludo institucional", false, "no greeting"),
                AttributeVerdict::judged("Confirmación de la negociación", true, "confirmed"),
            ],
            ..Default::default()
        };
        let ev = evaluator(report);

        // No closed-deal evidence in the transcript, so the closure
        // attribute is forced NA and its weight never deducted.
        let outcome = ev
            .evaluate_transcript("call", "Hola, le llamo del banco.", &matrix(), "")
            .await
            .unwrap();

        assert_eq!(outcome.verdicts.len(), 2);
        assert!(!outcome.verdicts[1].applies);
        assert!((outcome.score.final_score - 90.0).abs() < 1e-9);
        assert!(outcome.score.critical_clean());
        assert!(outcome.audio_hash.is_none());
    }

    #[tokio::test]
    async fn test_missing_audio_rejected() {
        let ev = evaluator(AnalysisReport::default());
        let err = ev
            .evaluate_audio(Path::new("/nonexistent/call.mp3"), &matrix(), "", "es")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
