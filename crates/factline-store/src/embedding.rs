//! Embedding Model for Text Vectorization
//!
//! Deterministic, dependency-free embeddings for tests and offline demos.
//!
//! `MockEmbeddingModel` uses feature hashing: every lower-cased word is
//! hashed with SHA-256 into a signed bucket and the result is normalized to unit length.
//! Texts that share words land close together under cosine distance, which is
//! enough for the retrieval pipeline to return sensible neighbours without a
//! model download. The hash is fixed, so vectors persisted in a corpus stay
//! valid across toolchain upgrades.
//!
//! # Examples
//!
//! ```rust
//! use factline_store::embedding::MockEmbeddingModel;
//! use factline_domain::traits::EmbeddingService;
//!
//! let model = MockEmbeddingModel::new(384);
//! let embedding = model.embed("Drinking bleach cures the virus").unwrap();
//! assert_eq!(embedding.len(), 384);
//!
//! // Same text always produces same embedding
//! assert_eq!(embedding, model.embed("Drinking bleach cures the virus").unwrap());
//! ```

use factline_domain::traits::{EmbeddingService, ServiceError};
use sha2::{Digest, Sha256};

/// Hash-based embedding model
pub struct MockEmbeddingModel {
    dimension: usize,
}

impl MockEmbeddingModel {
    /// Create a model producing vectors of `dimension` components
    pub fn new(dimension: usize) -> Self {
        Self { dimension: dimension.max(1) }
    }

    /// Dimension of produced embeddings
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }
}

impl EmbeddingService for MockEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let mut embedding = vec![0.0f32; self.dimension];
        let mut seen = 0usize;

        for token in Self::tokens(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            let hash = u64::from_be_bytes(head);

            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
            seen += 1;
        }

        if seen == 0 {
            return Err(ServiceError::Rejected(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        } else {
            // Every token cancelled out; fall back to a fixed unit vector
            embedding[0] = 1.0;
        }

        Ok(embedding)
    }
}
