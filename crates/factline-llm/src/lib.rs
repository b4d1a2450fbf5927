//! Factline Model Provider Layer
//!
//! Pluggable text-generation and embedding providers behind the collaborator
//! traits from `factline-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OllamaProvider`: Local Ollama API (generation and embeddings)
//! - `OpenAiProvider`: OpenAI-compatible chat completions
//! - `AnthropicProvider`: Anthropic messages API
//! - `ProviderChain`: Ordered fallback over any of the above
//!
//! # Examples
//!
//! ```
//! use factline_llm::{MockProvider, ProviderChain};
//! use factline_domain::traits::{GenerationParams, TextGenerator};
//! use std::sync::Arc;
//!
//! let chain = ProviderChain::new(vec![
//!     Arc::new(MockProvider::failing("primary")),
//!     Arc::new(MockProvider::new("SUPPORTS")),
//! ]);
//! let out = chain.generate("prompt", &GenerationParams::default()).unwrap();
//! assert_eq!(out, "SUPPORTS");
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod chain;
pub mod config;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;

use factline_domain::traits::ServiceError;
use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use chain::{ProviderAttempt, ProviderChain};
pub use config::{ProviderConfig, ProviderKind};
pub use mock::MockProvider;
pub use ollama::{OllamaEmbedder, OllamaProvider};
pub use openai::OpenAiProvider;

/// Errors that can occur during model provider operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every provider in a chain failed
    #[error("All model providers failed: {}", summarize(.0))]
    AllProvidersFailed(Vec<ProviderAttempt>),
}

fn summarize(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers configured".to_string();
    }
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.provider, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<LlmError> for ServiceError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::InvalidResponse(msg) => ServiceError::InvalidResponse(msg),
            LlmError::Config(msg) => ServiceError::Rejected(msg),
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

/// Strip reasoning blocks (`<think>...</think>`) and surrounding whitespace
///
/// Some local models emit their chain of thought before the answer. An
/// unterminated block swallows the rest of the text.
///
/// # Examples
///
/// ```
/// use factline_llm::clean_response;
///
/// assert_eq!(clean_response("<think>hmm</think>\nSUPPORTS"), "SUPPORTS");
/// assert_eq!(clean_response("  plain  "), "plain");
/// ```
pub fn clean_response(text: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find(CLOSE) {
            Some(end) => rest = &after_open[end + CLOSE.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

pub(crate) fn status_error(status: reqwest::StatusCode, body: String, model: &str) -> LlmError {
    match status {
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_multiple_blocks() {
        let raw = "<think>a</think>CONTRA<think>b</think>DICTS";
        assert_eq!(clean_response(raw), "CONTRADICTS");
    }

    #[test]
    fn test_clean_response_unterminated() {
        assert_eq!(clean_response("SUPPORTS <think>never closed"), "SUPPORTS");
    }

    #[test]
    fn test_all_failed_display() {
        let err = LlmError::AllProvidersFailed(vec![
            ProviderAttempt { provider: "ollama".into(), error: "refused".into() },
            ProviderAttempt { provider: "openai".into(), error: "429".into() },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("All model providers failed"));
        assert!(msg.contains("ollama: refused"));
        assert!(msg.contains("openai: 429"));
    }

    #[test]
    fn test_into_service_error() {
        let svc: ServiceError = LlmError::InvalidResponse("bad json".into()).into();
        assert_eq!(svc, ServiceError::InvalidResponse("bad json".into()));
        let svc: ServiceError = LlmError::RateLimitExceeded.into();
        assert!(matches!(svc, ServiceError::Unavailable(_)));
    }
}
