//! Ordered provider fallback
//!
//! Each configured provider is tried once, in order. The first success wins;
//! if every provider fails the chain reports all attempts together. There is
//! no backoff or retry loop: rescheduling is the caller's job.

use crate::LlmError;
use factline_domain::traits::{GenerationParams, ServiceError, TextGenerator};
use std::sync::Arc;
use tracing::{debug, warn};

/// One failed provider attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    /// Provider name
    pub provider: String,
    /// Error message
    pub error: String,
}

/// Text generator that falls back across providers
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn TextGenerator>>,
}

impl ProviderChain {
    /// Create a chain; providers are tried in the given order
    pub fn new(providers: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self { providers }
    }

    /// Number of providers in the chain
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in order
    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Try each provider once
    ///
    /// # Errors
    ///
    /// [`LlmError::AllProvidersFailed`] carrying every attempt when no provider
    /// succeeds (including when the chain is empty).
    pub fn try_generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, LlmError> {
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match provider.generate(prompt, params) {
                Ok(text) => {
                    debug!("provider {} answered", provider.name());
                    return Ok(text);
                }
                Err(e) => {
                    warn!("provider {} failed: {}", provider.name(), e);
                    attempts.push(ProviderAttempt {
                        provider: provider.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(LlmError::AllProvidersFailed(attempts))
    }
}

impl TextGenerator for ProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ServiceError> {
        self.try_generate(prompt, params).map_err(ServiceError::from)
    }
}
