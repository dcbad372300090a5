//! Command-line interface for callscope.
//!
//! Provides commands for evaluating a single call, running batch jobs
//! over a set of recordings, validating matrices, and inspecting the
//! resolved configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{
    load_matrix, EvaluationStore, HttpAnalyzer, WhisperTranscriber,
};
use crate::config;
use crate::core::{BatchItem, Evaluator, Orchestrator};
use crate::domain::{ComplianceMatrix, EvaluationOutcome, GroupSummary, TaskStatus, VerdictStatus};

/// callscope - Call-center compliance audit engine
#[derive(Parser, Debug)]
#[command(name = "callscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single call against a compliance matrix
    Evaluate {
        /// Audio file to evaluate
        audio: Option<PathBuf>,

        /// Evaluate a transcript text file instead of audio
        #[arg(short, long, conflicts_with = "audio")]
        transcript: Option<PathBuf>,

        /// Compliance matrix file (csv, yaml or json)
        #[arg(short, long)]
        matrix: PathBuf,

        /// Campaign context passed to the analyzer
        #[arg(short, long, default_value = "")]
        context: String,

        /// Default unproven attributes to not-applicable
        #[arg(long)]
        strict: bool,

        /// Persist the evaluation record
        #[arg(long)]
        save: bool,
    },

    /// Evaluate every recording matching a glob pattern as one batch job
    Batch {
        /// Glob pattern for audio files (e.g. "calls/**/*.mp3")
        pattern: String,

        /// Compliance matrix file (csv, yaml or json)
        #[arg(short, long)]
        matrix: PathBuf,

        /// Campaign context passed to the analyzer
        #[arg(short, long, default_value = "")]
        context: String,

        /// Default unproven attributes to not-applicable
        #[arg(long)]
        strict: bool,
    },

    /// Validate a compliance matrix and print its attributes
    Matrix {
        /// Matrix file to validate
        path: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Evaluate {
                audio,
                transcript,
                matrix,
                context,
                strict,
                save,
            } => evaluate_one(audio, transcript, &matrix, &context, strict, save).await,
            Commands::Batch {
                pattern,
                matrix,
                context,
                strict,
            } => run_batch(&pattern, &matrix, &context, strict).await,
            Commands::Matrix { path } => show_matrix(&path),
            Commands::Config => show_config(),
        }
    }
}

/// Build an evaluator from the resolved configuration.
fn build_evaluator(strict: bool) -> Result<Evaluator> {
    let cfg = config::config()?;

    let mut policy = cfg.policy.clone();
    if strict {
        policy.strict_mode = true;
    }

    Ok(Evaluator::new(
        Arc::new(WhisperTranscriber::with_settings(
            cfg.whisper_binary.clone(),
            cfg.whisper_model.clone(),
        )),
        Arc::new(HttpAnalyzer::new(cfg.analyzer.clone())),
        cfg.lexicon.clone(),
        cfg.roles.clone(),
        policy,
    ))
}

async fn evaluate_one(
    audio: Option<PathBuf>,
    transcript: Option<PathBuf>,
    matrix_path: &PathBuf,
    context: &str,
    strict: bool,
    save: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let matrix = load_matrix(matrix_path)?;
    let evaluator = build_evaluator(strict)?;

    let outcome = match (audio, transcript) {
        (Some(audio), None) => {
            evaluator
                .evaluate_audio(&audio, &matrix, context, &cfg.language)
                .await?
        }
        (None, Some(path)) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read transcript: {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            evaluator
                .evaluate_transcript(&name, &text, &matrix, context)
                .await?
        }
        _ => anyhow::bail!("Provide an audio file or --transcript <file>"),
    };

    if save {
        let store = EvaluationStore::new(&cfg.home);
        let path = store.save(&outcome)?;
        println!("Record saved: {}", path.display());
    }

    print_outcome(&outcome);
    Ok(())
}

async fn run_batch(
    pattern: &str,
    matrix_path: &PathBuf,
    context: &str,
    strict: bool,
) -> Result<()> {
    let cfg = config::config()?;
    let matrix = load_matrix(matrix_path)?;

    let mut items = Vec::new();
    for entry in glob::glob(pattern).context("Invalid glob pattern")? {
        let path = entry.context("Failed to read glob entry")?;
        if path.is_file() {
            items.push(BatchItem::from_path(path));
        }
    }
    if items.is_empty() {
        anyhow::bail!("No files match pattern: {}", pattern);
    }

    println!("Submitting batch of {} recordings...", items.len());

    let evaluator = Arc::new(build_evaluator(strict)?);
    let store = Arc::new(EvaluationStore::new(&cfg.home));
    let orchestrator = Orchestrator::new(evaluator, Some(store))
        .with_language(cfg.language.clone());

    let job_id = orchestrator
        .submit(matrix, items, context.to_string())
        .await?;
    println!("Job: {}", job_id);

    // Live progress until the job finishes
    let mut progress = orchestrator
        .subscribe(job_id)
        .await
        .context("Job disappeared from registry")?;
    loop {
        let snapshot = progress.borrow_and_update().clone();
        println!(
            "  [{}/{}] {:?}",
            snapshot.completed, snapshot.total, snapshot.status
        );
        for item in snapshot.items.iter().filter(|i| i.status == TaskStatus::Error) {
            if let Some(error) = &item.error {
                println!("    ✗ {}: {}", item.name, error);
            }
        }
        if snapshot.status == crate::domain::JobStatus::Done {
            break;
        }
        if progress.changed().await.is_err() {
            break;
        }
    }

    let job = orchestrator
        .get_result(job_id)
        .await
        .context("Job disappeared from registry")?;

    for task in &job.items {
        if let Some(outcome) = &task.result {
            println!();
            print_outcome(outcome);
        }
    }

    if let Some(summary) = &job.group_summary {
        print_group_summary(summary);
    }

    Ok(())
}

fn show_matrix(path: &PathBuf) -> Result<()> {
    let matrix = load_matrix(path)?;
    print_matrix(&matrix);
    Ok(())
}

fn print_matrix(matrix: &ComplianceMatrix) {
    println!("Matrix: {} attributes", matrix.len());
    for attr in &matrix.attributes {
        println!(
            "  {:<45} {:<20} weight {}",
            attr.name, attr.category, attr.weight
        );
    }
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Resolved configuration:");
    match &cfg.config_file {
        Some(path) => println!("  Config file:  {}", path.display()),
        None => println!("  Config file:  (none found)"),
    }
    println!("  Home:         {}", cfg.home.display());
    println!("  Language:     {}", cfg.language);
    println!("  Whisper:      {} (model {})", cfg.whisper_binary, cfg.whisper_model);
    println!("  Analyzer:     {} ({})", cfg.analyzer.endpoint, cfg.analyzer.model);
    println!("  Strict mode:  {}", cfg.policy.strict_mode);
    println!("  Critical at:  weight >= {}", cfg.policy.critical_threshold);
    if !cfg.policy.forced_na.is_empty() {
        let mut names: Vec<&str> = cfg.policy.forced_na.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        println!("  Forced NA:    {}", names.join(", "));
    }

    Ok(())
}

fn print_outcome(outcome: &EvaluationOutcome) {
    println!("═══ {} ═══", outcome.name);
    println!(
        "Score: {:.1} / {:.0}{}",
        outcome.score.final_score,
        outcome.score.base_score,
        if outcome.score.critical_clean() {
            ""
        } else {
            "  [CRITICAL]"
        }
    );

    for scored in &outcome.score.per_attribute {
        let verdict = &scored.verdict;
        let mark = if !verdict.applies {
            "○"
        } else if verdict.fulfilled == Some(true) {
            "✓"
        } else {
            "✗"
        };
        let status = if verdict.status == VerdictStatus::NotApplicable {
            "n/a".to_string()
        } else if scored.deduction > 0.0 {
            format!("-{}", scored.deduction)
        } else {
            "ok".to_string()
        };
        println!("  {} {:<45} {}", mark, verdict.attribute, status);
        if !verdict.justification.is_empty() {
            println!("      {}", verdict.justification);
        }
    }

    for breakdown in &outcome.score.per_category {
        println!(
            "  {:<20} {}% ({} ok, {} failed, {} n/a)",
            breakdown.category,
            breakdown.percentage,
            breakdown.fulfilled_count,
            breakdown.unfulfilled_count,
            breakdown.not_applicable_count
        );
    }

    if !outcome.findings.is_empty() {
        println!("Findings:");
        for finding in &outcome.findings {
            println!("  - {}", finding);
        }
    }
    if !outcome.recommendations.is_empty() {
        println!("Recommendations:");
        for rec in &outcome.recommendations {
            println!("  - {}", rec);
        }
    }
}

fn print_group_summary(summary: &GroupSummary) {
    println!();
    println!("═══ Group summary ═══");
    println!("{}", summary.narrative);
    if !summary.top_findings.is_empty() {
        println!("Top findings:");
        for entry in &summary.top_findings {
            println!("  {:>3}× {}", entry.count, entry.text);
        }
    }
    if !summary.top_recommendations.is_empty() {
        println!("Top recommendations:");
        for entry in &summary.top_recommendations {
            println!("  {:>3}× {}", entry.count, entry.text);
        }
    }
    if !summary.top_critical.is_empty() {
        println!("Critical attributes affected:");
        for entry in &summary.top_critical {
            println!("  {:>3}× {}", entry.count, entry.text);
        }
    }
}
