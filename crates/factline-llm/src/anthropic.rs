//! Anthropic messages API provider

use crate::http::LazyClient;
use crate::{status_error, LlmError};
use factline_domain::traits::{GenerationParams, ServiceError, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value
const API_VERSION: &str = "2023-06-01";

/// Messages API provider
pub struct AnthropicProvider {
    base_url: String,
    model: String,
    api_key: String,
    client: LazyClient,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a provider
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::Config("Anthropic API key is empty".to_string()));
        }
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client: LazyClient::new(timeout),
        })
    }

    /// Single completion request
    pub fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: [Message { role: "user", content: prompt }],
        };

        let response = self
            .client
            .get()?
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            return Err(status_error(status, text, &self.model));
        }

        let parsed = response
            .json::<MessagesResponse>()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text: String = parsed.content.into_iter().filter_map(|b| b.text).collect();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("No text in response".to_string()));
        }
        Ok(text)
    }
}

impl TextGenerator for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ServiceError> {
        self.complete(prompt, params).map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_key() {
        let result =
            AnthropicProvider::new(DEFAULT_BASE_URL, "claude-3-haiku", "", Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_response_parsing_joins_text_blocks() {
        let raw = r#"{"content":[{"type":"text","text":"SUP"},{"type":"text","text":"PORTS"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.content.into_iter().filter_map(|b| b.text).collect();
        assert_eq!(text, "SUPPORTS");
    }
}
