//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage could not be opened
    #[error("Storage error: {0}")]
    Store(#[from] factline_store::StoreError),

    /// Model provider could not be built
    #[error("Provider error: {0}")]
    Llm(#[from] factline_llm::LlmError),

    /// Verification failed
    #[error("Verification error: {0}")]
    Verifier(#[from] factline_verifier::VerifierError),

    /// Propagation analysis failed
    #[error("Propagation error: {0}")]
    Propagation(#[from] factline_propagation::PropagationError),

    /// Sentinel failed
    #[error("Sentinel error: {0}")]
    Sentinel(#[from] factline_sentinel::SentinelError),

    /// Guardrails misconfigured
    #[error("Guardrails error: {0}")]
    Guardrails(#[from] factline_guardrails::GuardrailsError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
