//! Provider configuration
//!
//! A list of `ProviderConfig` entries describes a fallback chain. API keys are
//! never stored in configuration files; entries name the environment variable
//! that holds the key.

use crate::{AnthropicProvider, LlmError, MockProvider, OllamaProvider, OpenAiProvider, ProviderChain};
use factline_domain::traits::TextGenerator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Fixed-response mock
    Mock,
    /// Local Ollama
    Ollama,
    /// OpenAI-compatible chat completions
    OpenAi,
    /// Anthropic messages API
    Anthropic,
}

/// One entry in a provider chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Backend
    pub kind: ProviderKind,

    /// Model name
    #[serde(default)]
    pub model: String,

    /// Base URL; empty selects the backend default
    #[serde(default)]
    pub endpoint: String,

    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed answer for the mock backend
    #[serde(default)]
    pub mock_response: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ProviderConfig {
    /// Local Ollama entry
    pub fn ollama(model: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Ollama,
            model: model.into(),
            endpoint: String::new(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            mock_response: None,
        }
    }

    /// Mock entry answering every prompt with `response`
    pub fn mock(response: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Mock,
            model: "mock".to_string(),
            endpoint: String::new(),
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            mock_response: Some(response.into()),
        }
    }

    fn endpoint_or(&self, default: &str) -> String {
        if self.endpoint.is_empty() {
            default.to_string()
        } else {
            self.endpoint.clone()
        }
    }

    fn api_key(&self) -> Result<String, LlmError> {
        let var = self
            .api_key_env
            .as_deref()
            .ok_or_else(|| LlmError::Config(format!("{:?} provider needs api_key_env", self.kind)))?;
        std::env::var(var).map_err(|_| LlmError::Config(format!("Environment variable {} is not set", var)))
    }

    /// Build the provider this entry describes
    pub fn build(&self) -> Result<Arc<dyn TextGenerator>, LlmError> {
        let timeout = Duration::from_secs(self.timeout_secs);
        let provider: Arc<dyn TextGenerator> = match self.kind {
            ProviderKind::Mock => Arc::new(MockProvider::new(
                self.mock_response.clone().unwrap_or_default(),
            )),
            ProviderKind::Ollama => Arc::new(OllamaProvider::with_timeout(
                self.endpoint_or(crate::ollama::DEFAULT_ENDPOINT),
                &self.model,
                timeout,
            )?),
            ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
                self.endpoint_or(crate::openai::DEFAULT_BASE_URL),
                &self.model,
                self.api_key()?,
                timeout,
            )?),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                self.endpoint_or(crate::anthropic::DEFAULT_BASE_URL),
                &self.model,
                self.api_key()?,
                timeout,
            )?),
        };
        Ok(provider)
    }

    /// Build a fallback chain from a list of entries
    ///
    /// Entries that cannot be built (missing key, bad client config) are
    /// skipped with a warning so one broken entry does not take down the chain.
    pub fn build_chain(configs: &[ProviderConfig]) -> ProviderChain {
        let providers = configs
            .iter()
            .filter_map(|c| match c.build() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("skipping {:?} provider: {}", c.kind, e);
                    None
                }
            })
            .collect();
        ProviderChain::new(providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::traits::GenerationParams;

    #[test]
    fn test_parse_provider_list() {
        let raw = r#"[
            { "kind": "ollama", "model": "llama3" },
            { "kind": "openai", "model": "gpt-4o-mini", "api_key_env": "OPENAI_API_KEY", "timeout_secs": 10 }
        ]"#;
        let parsed: Vec<ProviderConfig> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].kind, ProviderKind::Ollama);
        assert_eq!(parsed[0].timeout_secs, 30);
        assert_eq!(parsed[1].kind, ProviderKind::OpenAi);
        assert_eq!(parsed[1].api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_missing_key_env_skipped_in_chain() {
        let configs = vec![
            ProviderConfig {
                kind: ProviderKind::OpenAi,
                model: "gpt-4o-mini".to_string(),
                endpoint: String::new(),
                api_key_env: Some("FACTLINE_TEST_KEY_THAT_IS_NOT_SET".to_string()),
                timeout_secs: 5,
                mock_response: None,
            },
            ProviderConfig::mock("SUPPORTS"),
        ];
        let chain = ProviderConfig::build_chain(&configs);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.generate("x", &GenerationParams::default()).unwrap(), "SUPPORTS");
    }

    #[test]
    fn test_ollama_builds_without_network() {
        let provider = ProviderConfig::ollama("llama3").build().unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
