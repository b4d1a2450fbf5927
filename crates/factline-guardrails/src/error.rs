//! Guardrails error types

use thiserror::Error;

/// Errors that can occur while building the policy layer
#[derive(Error, Debug)]
pub enum GuardrailsError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A built-in pattern failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
