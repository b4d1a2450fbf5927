//! Error types for propagation analysis

use factline_domain::traits::ServiceError;
use thiserror::Error;

/// Errors that can occur during propagation analysis
///
/// Reports never fail on graph trouble; their sections degrade instead.
/// These errors cover lookups and ingestion, which have no fallback.
#[derive(Error, Debug)]
pub enum PropagationError {
    /// Graph store failed or timed out
    #[error("Graph error: {0}")]
    Graph(#[from] ServiceError),

    /// Patient-zero search needs non-empty claim text
    #[error("Claim text is empty")]
    EmptyQuery,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
