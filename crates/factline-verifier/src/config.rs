//! Configuration for the Verifier

use factline_domain::traits::GenerationParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for verification runs
///
/// # Examples
///
/// ```
/// use factline_verifier::VerifierConfig;
///
/// let config = VerifierConfig::default();
/// assert_eq!(config.top_k, 5);
/// assert_eq!(config.cache_ttl_secs, 3600);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Evidence documents retrieved per claim
    pub top_k: usize,

    /// Lifetime of cached verdicts (seconds)
    pub cache_ttl_secs: u64,

    /// Embedding call deadline (seconds)
    pub embedding_timeout_secs: u64,

    /// Corpus query deadline (seconds)
    pub retrieval_timeout_secs: u64,

    /// Deadline per stance classification (seconds)
    pub stance_timeout_secs: u64,

    /// Explanation generation deadline (seconds)
    pub explanation_timeout_secs: u64,

    /// Cache read/write deadline (milliseconds)
    pub cache_timeout_ms: u64,

    /// Sampling temperature for stance classification
    pub stance_temperature: f32,

    /// Token limit for stance classification
    pub stance_max_tokens: u32,

    /// Sampling temperature for explanations
    pub explanation_temperature: f32,

    /// Token limit for explanations
    pub explanation_max_tokens: u32,

    /// Sources quoted in the explanation prompt
    pub explanation_sources: usize,

    /// Characters of each excerpt quoted in the explanation prompt
    pub explanation_excerpt_chars: usize,

    /// Ask the model for an explanation; when off a fixed summary is used
    pub generate_explanations: bool,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            cache_ttl_secs: 3600,
            embedding_timeout_secs: 10,
            retrieval_timeout_secs: 10,
            stance_timeout_secs: 30,
            explanation_timeout_secs: 60,
            cache_timeout_ms: 500,
            stance_temperature: 0.1,
            stance_max_tokens: 10,
            explanation_temperature: 0.7,
            explanation_max_tokens: 200,
            explanation_sources: 3,
            explanation_excerpt_chars: 200,
            generate_explanations: true,
        }
    }
}

impl VerifierConfig {
    /// Tight deadlines and fewer sources, for high-volume triage
    pub fn aggressive() -> Self {
        Self {
            top_k: 3,
            cache_ttl_secs: 7200,
            embedding_timeout_secs: 5,
            retrieval_timeout_secs: 5,
            stance_timeout_secs: 10,
            explanation_timeout_secs: 20,
            cache_timeout_ms: 200,
            ..Self::default()
        }
    }

    /// Generous deadlines and more sources, for slow local models
    pub fn lenient() -> Self {
        Self {
            top_k: 8,
            cache_ttl_secs: 1800,
            embedding_timeout_secs: 30,
            retrieval_timeout_secs: 30,
            stance_timeout_secs: 120,
            explanation_timeout_secs: 180,
            cache_timeout_ms: 2000,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.embedding_timeout_secs == 0
            || self.retrieval_timeout_secs == 0
            || self.stance_timeout_secs == 0
            || self.explanation_timeout_secs == 0
            || self.cache_timeout_ms == 0
        {
            return Err("timeouts must be greater than 0".to_string());
        }
        if self.stance_max_tokens == 0 || self.explanation_max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.stance_temperature)
            || !(0.0..=2.0).contains(&self.explanation_temperature)
        {
            return Err("temperatures must be within [0, 2]".to_string());
        }
        Ok(())
    }

    /// Cache entry lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Embedding deadline
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// Corpus query deadline
    pub fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.retrieval_timeout_secs)
    }

    /// Stance classification deadline
    pub fn stance_timeout(&self) -> Duration {
        Duration::from_secs(self.stance_timeout_secs)
    }

    /// Explanation deadline
    pub fn explanation_timeout(&self) -> Duration {
        Duration::from_secs(self.explanation_timeout_secs)
    }

    /// Cache call deadline
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Sampling parameters for stance classification
    pub fn stance_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.stance_temperature,
            max_tokens: self.stance_max_tokens,
        }
    }

    /// Sampling parameters for explanations
    pub fn explanation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.explanation_temperature,
            max_tokens: self.explanation_max_tokens,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
