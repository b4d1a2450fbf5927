//! Trait definitions for external collaborators
//!
//! These traits are the boundary between the analytics core and the services
//! it leans on. All of them are synchronous; async callers run them on the
//! blocking pool under a timeout and pick a fallback on failure.

use crate::{Post, Posting, User};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Failure reported by a collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The service could not be reached or refused the request
    Unavailable(String),

    /// The service did not answer in time
    Timeout(Duration),

    /// The service answered with something unusable
    InvalidResponse(String),

    /// The request itself was rejected (bad input, dimension mismatch)
    Rejected(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable(msg) => write!(f, "service unavailable: {}", msg),
            ServiceError::Timeout(after) => write!(f, "service timed out after {:?}", after),
            ServiceError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
            ServiceError::Rejected(msg) => write!(f, "request rejected: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Text-to-vector service
pub trait EmbeddingService: Send + Sync {
    /// Embed the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}

/// Sampling parameters for a generation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// Text-generation service
pub trait TextGenerator: Send + Sync {
    /// Name used in logs and aggregate failures
    fn name(&self) -> &str;

    /// Generate a completion for the prompt
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ServiceError>;
}

/// A nearest-neighbour hit from the retrieval corpus
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedDocument {
    /// Document id
    pub id: String,
    /// Document metadata (title, url, source_type, credibility)
    pub metadata: HashMap<String, String>,
    /// Document body
    pub document: String,
    /// Distance from the query; smaller is closer
    pub distance: f32,
}

/// Vector store holding the evidence corpus
pub trait RetrievalStore: Send + Sync {
    /// Return up to `k` nearest documents, closest first
    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>, ServiceError>;

    /// Add (or replace) a document
    fn add(
        &self,
        embedding: &[f32],
        document: &str,
        metadata: HashMap<String, String>,
        id: &str,
    ) -> Result<(), ServiceError>;
}

/// Social graph store
///
/// Nodes are upserted by key. Edge upserts are idempotent.
pub trait GraphStore: Send + Sync {
    /// Insert or update a user by `user_id`
    fn upsert_user(&self, user: &User) -> Result<(), ServiceError>;

    /// Insert or update a post by `post_id`
    fn upsert_post(&self, post: &Post) -> Result<(), ServiceError>;

    /// Record that `user_id` posted `post_id` at `posted_at`
    fn link_posted(&self, user_id: &str, post_id: &str, posted_at: u64) -> Result<(), ServiceError>;

    /// Record that `reshare_id` was shared from `original_id`
    fn link_shared_from(&self, reshare_id: &str, original_id: &str) -> Result<(), ServiceError>;

    /// Posts whose claim text contains `needle`
    fn posts_containing(&self, needle: &str) -> Result<Vec<Post>, ServiceError>;

    /// Look up a post
    fn post(&self, post_id: &str) -> Result<Option<Post>, ServiceError>;

    /// The user with a `POSTED` edge to the post
    fn author_of(&self, post_id: &str) -> Result<Option<User>, ServiceError>;

    /// Direct reshares of a post (one `SHARED_FROM` hop)
    fn reshares_of(&self, post_id: &str) -> Result<Vec<Post>, ServiceError>;

    /// `POSTED` edges with timestamps in `[from, to]`
    fn postings_between(&self, from: u64, to: u64) -> Result<Vec<Posting>, ServiceError>;
}

/// Value and expiry of a windowed counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    /// Current count
    pub value: u64,
    /// Unix seconds at which the counter resets
    pub expires_at: u64,
}

/// Key-value cache with counters, queues and fan-out
pub trait CacheStore: Send + Sync {
    /// Read a live value
    fn get(&self, key: &str) -> Result<Option<String>, ServiceError>;

    /// Write a value, optionally expiring after `ttl`
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), ServiceError>;

    /// Remove a key; returns whether it existed
    fn delete(&self, key: &str) -> Result<bool, ServiceError>;

    /// Atomically increment a counter and return its new value
    ///
    /// The first increment of a fresh (or expired) counter sets its expiry to
    /// now + `window`; later increments inside the window keep that expiry.
    fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<Counter, ServiceError>;

    /// Read a live counter without changing it
    fn counter(&self, key: &str) -> Result<Option<Counter>, ServiceError>;

    /// Live keys starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, ServiceError>;

    /// Append to the tail of a FIFO queue; returns the new length
    fn push(&self, queue: &str, item: &str) -> Result<usize, ServiceError>;

    /// Take from the head of a FIFO queue
    fn pop(&self, queue: &str) -> Result<Option<String>, ServiceError>;

    /// Publish to a channel; returns the number of receivers
    fn publish(&self, channel: &str, message: &str) -> Result<usize, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::Timeout(Duration::from_secs(3));
        assert_eq!(err.to_string(), "service timed out after 3s");
        let err = ServiceError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_default_generation_params() {
        let params = GenerationParams::default();
        assert_eq!(params.max_tokens, 1000);
    }
}
