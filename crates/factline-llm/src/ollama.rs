//! Ollama Provider Implementation
//!
//! Integration with Ollama's local API for both text generation and
//! embeddings. Running a local model keeps claim text on the host.
//!
//! # Examples
//!
//! ```no_run
//! use factline_llm::OllamaProvider;
//! use factline_domain::traits::{GenerationParams, TextGenerator};
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! let params = GenerationParams { temperature: 0.1, max_tokens: 10 };
//! let answer = provider.generate("Respond with only: SUPPORTS", &params).unwrap();
//! ```

use crate::http::LazyClient;
use crate::{status_error, LlmError};
use factline_domain::traits::{EmbeddingService, GenerationParams, ServiceError, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// Default timeout for requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama API provider for local inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: LazyClient,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: LazyClient::new(timeout),
        })
    }

    /// Create a provider on the default local endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Generate text using the Ollama API (single attempt)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Response format is invalid
    pub fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        debug!("ollama generate: model={}, prompt_len={}", self.model, prompt.len());

        let response = self
            .client
            .get()?
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, text, &self.model));
        }

        response
            .json::<GenerateResponse>()
            .map(|r| r.response)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

impl TextGenerator for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ServiceError> {
        self.complete(prompt, params).map_err(ServiceError::from)
    }
}

/// Embedding service backed by Ollama's embeddings endpoint
pub struct OllamaEmbedder {
    endpoint: String,
    model: String,
    client: LazyClient,
}

impl OllamaEmbedder {
    /// Create an embedder for the given endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: LazyClient::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    /// Embedder using `nomic-embed-text` on the local endpoint
    pub fn default_local() -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_EMBEDDING_MODEL)
    }

    fn request(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .client
            .get()?
            .post(&url)
            .json(&EmbeddingRequest { model: &self.model, prompt: text })
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, body, &self.model));
        }

        let parsed = response
            .json::<EmbeddingResponse>()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse embedding: {}", e)))?;
        if parsed.embedding.is_empty() {
            return Err(LlmError::InvalidResponse("Empty embedding".to_string()));
        }
        Ok(parsed.embedding)
    }
}

impl EmbeddingService for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        self.request(text).map_err(ServiceError::from)
    }
}
