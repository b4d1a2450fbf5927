//! Deterministic mock provider

use crate::LlmError;
use factline_domain::traits::{GenerationParams, ServiceError, TextGenerator};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Error,
}

#[derive(Debug, Default)]
struct MockState {
    exact: HashMap<String, Reply>,
    containing: Vec<(String, Reply)>,
    prompts: Vec<String>,
}

/// Mock text generator for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Lookup order: exact prompt match, then the first registered fragment the
/// prompt contains, then the default response.
///
/// # Examples
///
/// ```
/// use factline_llm::MockProvider;
/// use factline_domain::traits::{GenerationParams, TextGenerator};
///
/// let params = GenerationParams::default();
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt", &params).unwrap(), "Fixed response");
///
/// // Responses keyed on prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response_containing("WHO bulletin", "SUPPORTS");
/// assert_eq!(provider.generate("Source: WHO bulletin says...", &params).unwrap(), "SUPPORTS");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    default_response: Option<String>,
    delay: Option<Duration>,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            default_response: Some(response.into()),
            delay: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a MockProvider that fails every call unless a registered response matches
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_response: None,
            delay: None,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the provider name reported in logs and chain failures
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for an exact prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.lock().exact.insert(prompt.into(), Reply::Text(response.into()));
    }

    /// Add a response for any prompt containing `fragment`
    pub fn add_response_containing(
        &mut self,
        fragment: impl Into<String>,
        response: impl Into<String>,
    ) {
        self.lock()
            .containing
            .push((fragment.into(), Reply::Text(response.into())));
    }

    /// Configure to return an error for an exact prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.lock().exact.insert(prompt.into(), Reply::Error);
    }

    /// Configure to return an error for any prompt containing `fragment`
    pub fn add_error_containing(&mut self, fragment: impl Into<String>) {
        self.lock().containing.push((fragment.into(), Reply::Error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Reset the call log
    pub fn reset_call_count(&self) {
        self.lock().prompts.clear();
    }

    // A poisoned lock only means another test thread panicked mid-call; the
    // state is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn answer(&self, prompt: &str) -> Result<String, LlmError> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        let reply = state.exact.get(prompt).cloned().or_else(|| {
            state
                .containing
                .iter()
                .find(|(fragment, _)| prompt.contains(fragment.as_str()))
                .map(|(_, reply)| reply.clone())
        });

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Error) => Err(LlmError::Communication("Mock error".to_string())),
            None => self
                .default_response
                .clone()
                .ok_or_else(|| LlmError::Communication(format!("{} is unavailable", self.name))),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl TextGenerator for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, ServiceError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.answer(prompt).map_err(ServiceError::from)
    }
}
