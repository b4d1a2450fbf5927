//! Factline Storage Layer
//!
//! In-process implementations of the collaborator contracts defined in
//! `factline_domain::traits`.
//!
//! # Architecture
//!
//! - `CorpusIndex`: evidence corpus. Documents persist in SQLite, nearest
//!   neighbour search runs on an in-memory HNSW index rebuilt on open.
//! - `SqliteGraphStore`: users, posts and the `POSTED` / `SHARED_FROM` edges.
//! - `MemoryCache`: key-value entries with TTL, windowed counters, FIFO
//!   queues and pub/sub channels, all behind one mutex.
//! - `MockEmbeddingModel`: deterministic feature-hashing embeddings.
//! - `call_blocking`: runs a synchronous collaborator call on the blocking
//!   pool under a deadline.
//!
//! # Examples
//!
//! ```no_run
//! use factline_store::{CorpusIndex, MockEmbeddingModel, SqliteGraphStore};
//!
//! let corpus = CorpusIndex::open("corpus.db", 384).unwrap();
//! let graph = SqliteGraphStore::new(":memory:").unwrap();
//! let embedder = MockEmbeddingModel::new(384);
//! ```

#![warn(missing_docs)]

pub mod blocking;
pub mod cache;
pub mod corpus;
pub mod embedding;
pub mod graph;

use factline_domain::traits::ServiceError;
use thiserror::Error;

pub use blocking::call_blocking;
pub use cache::{Clock, ManualClock, MemoryCache, SystemClock};
pub use corpus::CorpusIndex;
pub use embedding::MockEmbeddingModel;
pub use graph::SqliteGraphStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Embedding length does not match the index
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension provided
        actual: usize,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous holder of a store lock panicked
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DimensionMismatch { .. } | StoreError::InvalidData(_) => {
                ServiceError::Rejected(e.to_string())
            }
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let err: ServiceError = StoreError::DimensionMismatch { expected: 3, actual: 2 }.into();
        assert!(matches!(err, ServiceError::Rejected(_)));
    }

    #[test]
    fn test_poisoned_lock_is_unavailable() {
        let err: ServiceError = StoreError::LockPoisoned.into();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
