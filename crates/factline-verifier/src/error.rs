//! Error types for the Verifier

use factline_guardrails::GuardrailsError;
use thiserror::Error;

/// Errors that can occur during verification
///
/// Missing evidence is not an error; it yields an `unverified` result.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Embedding or generation failed, so no verdict could be attempted
    #[error("Provider failure: {0}")]
    ProviderFailure(String),

    /// Claim text is empty after trimming
    #[error("Claim text is empty")]
    EmptyClaim,

    /// Corpus write failed
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy layer could not be built
    #[error("Guardrails error: {0}")]
    Guardrails(#[from] GuardrailsError),
}
