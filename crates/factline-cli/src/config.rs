//! Configuration management for the CLI.
//!
//! One TOML file holds every component's settings. Missing sections take
//! their defaults.

use crate::error::{CliError, Result};
use factline_guardrails::GuardrailsConfig;
use factline_llm::ProviderConfig;
use factline_propagation::PropagationConfig;
use factline_sentinel::SentinelConfig;
use factline_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Verification pipeline
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Publication gate and review routing
    #[serde(default)]
    pub guardrails: GuardrailsConfig,

    /// Graph analyses
    #[serde(default)]
    pub propagation: PropagationConfig,

    /// Velocity and escalation
    #[serde(default)]
    pub sentinel: SentinelConfig,

    /// Text-generation fallback chain, tried in order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// On-disk locations
    #[serde(default)]
    pub storage: StorageSettings,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Embedding backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingKind {
    /// Deterministic hashed embeddings, no network
    Mock,
    /// Local Ollama embeddings endpoint
    Ollama,
}

/// Embedding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Backend
    pub kind: EmbeddingKind,
    /// Model name (Ollama)
    pub model: String,
    /// Base URL; empty selects the backend default
    pub endpoint: String,
    /// Vector dimension the corpus is created with
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            kind: EmbeddingKind::Ollama,
            model: factline_llm::ollama::DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: String::new(),
            dimension: 768,
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory for the corpus and graph databases (default: ~/.factline)
    pub data_dir: Option<PathBuf>,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

fn home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".factline"))
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file yields the defaults. Every section is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::path()?,
        };

        let config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            Self::default_with_providers()
        };
        config.validate()?;
        Ok(config)
    }

    fn default_with_providers() -> Self {
        Self {
            providers: default_providers(),
            ..Self::default()
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.verifier.validate().map_err(|e| CliError::Config(format!("[verifier] {}", e)))?;
        self.guardrails.validate().map_err(|e| CliError::Config(format!("[guardrails] {}", e)))?;
        self.propagation.validate().map_err(|e| CliError::Config(format!("[propagation] {}", e)))?;
        self.sentinel.validate().map_err(|e| CliError::Config(format!("[sentinel] {}", e)))?;
        if self.embedding.dimension == 0 {
            return Err(CliError::Config("[embedding] dimension must be greater than 0".into()));
        }
        Ok(())
    }

    /// Directory holding the databases.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => home_dir(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![ProviderConfig::ollama("llama3")]
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_llm::ProviderKind;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind, ProviderKind::Ollama);
        assert_eq!(config.sentinel, SentinelConfig::default());
        assert!(config.settings.color);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[sentinel]
trending_threshold = 50

[embedding]
kind = "mock"
dimension = 64

[[providers]]
kind = "mock"
mock_response = "CONTRADICTS"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.sentinel.trending_threshold, 50);
        assert_eq!(config.sentinel.velocity_window_secs, 3600);
        assert_eq!(config.embedding.kind, EmbeddingKind::Mock);
        assert_eq!(config.providers[0].kind, ProviderKind::Mock);
        assert_eq!(config.propagation, PropagationConfig::default());
    }

    #[test]
    fn test_invalid_section_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sentinel]\nvelocity_window_secs = 0\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default_with_providers();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.data_dir().unwrap(), dir.path());
    }
}
