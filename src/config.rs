//! Configuration for callscope.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CALLSCOPE_HOME)
//! 2. Config file (.callscope/config.yaml)
//! 3. Defaults (~/.callscope)
//!
//! Config file discovery:
//! - Searches current directory and parents for .callscope/config.yaml
//! - The home path in the config file is relative to the .callscope/
//!   directory

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::http_analyzer::AnalyzerSettings;
use crate::evidence::{normalized_key, SignalLexicon};
use crate::scoring::{RoleKeywords, ScoringPolicy};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub transcriber: Option<TranscriberConfig>,
    #[serde(default)]
    pub analyzer: Option<AnalyzerSettings>,
    #[serde(default)]
    pub policy: Option<PolicyConfig>,
    #[serde(default)]
    pub lexicon: Option<SignalLexicon>,
    #[serde(default)]
    pub roles: Option<RoleKeywords>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriberConfig {
    pub binary: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    pub strict: Option<bool>,
    pub critical_threshold: Option<f64>,
    /// Attribute names (any phrasing variant) forced to NA on every call
    #[serde(default)]
    pub forced_na: Vec<String>,
}

impl PolicyConfig {
    fn to_policy(&self) -> ScoringPolicy {
        let defaults = ScoringPolicy::default();
        ScoringPolicy {
            critical_threshold: self.critical_threshold.unwrap_or(defaults.critical_threshold),
            strict_mode: self.strict.unwrap_or(defaults.strict_mode),
            forced_na: self
                .forced_na
                .iter()
                .map(|n| normalized_key(n))
                .collect::<HashSet<String>>(),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to callscope home (evaluation records)
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Transcription language passed to whisper
    pub language: String,
    pub whisper_binary: String,
    pub whisper_model: String,
    pub analyzer: AnalyzerSettings,
    pub policy: ScoringPolicy,
    pub lexicon: SignalLexicon,
    pub roles: RoleKeywords,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".callscope").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".callscope");

    let config_file = find_config_file();
    let file: Option<ConfigFile> = match &config_file {
        Some(path) => Some(load_config_file(path)?),
        None => None,
    };

    // Resolve home: env var beats config file beats default
    let home = if let Ok(env_home) = std::env::var("CALLSCOPE_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(path), Some(home_str)) = (
        &config_file,
        file.as_ref().and_then(|f| f.home.as_deref()),
    ) {
        let config_dir = path.parent().unwrap_or(Path::new("."));
        resolve_path(config_dir, home_str)
    } else {
        default_home
    };

    let transcriber = file
        .as_ref()
        .and_then(|f| f.transcriber.clone())
        .unwrap_or_default();

    Ok(ResolvedConfig {
        home,
        language: file
            .as_ref()
            .and_then(|f| f.language.clone())
            .unwrap_or_else(|| "es".to_string()),
        whisper_binary: transcriber.binary.unwrap_or_else(|| {
            std::env::var("WHISPER_PATH").unwrap_or_else(|_| "whisper".to_string())
        }),
        whisper_model: transcriber.model.unwrap_or_else(|| "base".to_string()),
        analyzer: file
            .as_ref()
            .and_then(|f| f.analyzer.clone())
            .unwrap_or_default(),
        policy: file
            .as_ref()
            .and_then(|f| f.policy.as_ref())
            .map(PolicyConfig::to_policy)
            .unwrap_or_default(),
        lexicon: file
            .as_ref()
            .and_then(|f| f.lexicon.clone())
            .unwrap_or_default(),
        roles: file
            .as_ref()
            .and_then(|f| f.roles.clone())
            .unwrap_or_default(),
        config_file,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the callscope home directory (evaluation records).
pub fn callscope_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}
