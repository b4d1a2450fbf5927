//! Error types for the Sentinel

use factline_domain::traits::ServiceError;
use factline_verifier::VerifierError;
use thiserror::Error;

/// Errors that can occur while watching mentions and draining the queue
#[derive(Error, Debug)]
pub enum SentinelError {
    /// Cache store failed or timed out
    #[error("Cache error: {0}")]
    Cache(#[from] ServiceError),

    /// Queue item could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Verification of a queued claim failed
    #[error("Verification error: {0}")]
    Verification(#[from] VerifierError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
