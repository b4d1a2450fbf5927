//! FIFO verification queue on the cache store

use crate::error::SentinelError;
use crate::EscalationReason;
use factline_domain::traits::CacheStore;
use factline_domain::Claim;
use factline_store::call_blocking;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A claim waiting for a full verification run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Claim to verify
    pub claim: Claim,
    /// Why it was escalated
    pub reason: EscalationReason,
    /// Mention count at escalation, if known
    pub velocity: Option<u64>,
    /// Unix seconds the request was queued
    pub requested_at: u64,
}

/// Named FIFO of [`VerificationRequest`]s encoded as JSON
///
/// Any number of workers may pop from the same queue; each item is handed
/// to exactly one of them.
#[derive(Clone)]
pub struct VerificationQueue {
    cache: Arc<dyn CacheStore>,
    name: String,
    timeout: Duration,
}

impl VerificationQueue {
    /// Bind to the queue `name` on `cache`
    pub fn new(cache: Arc<dyn CacheStore>, name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            cache,
            name: name.into(),
            timeout,
        }
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a request; returns the queue length afterwards
    pub async fn push(&self, request: &VerificationRequest) -> Result<usize, SentinelError> {
        let item = serde_json::to_string(request)?;
        let (cache, name) = (Arc::clone(&self.cache), self.name.clone());
        Ok(call_blocking(self.timeout, move || cache.push(&name, &item)).await?)
    }

    /// Take the oldest request
    ///
    /// An item that does not decode is consumed and reported as
    /// [`SentinelError::Serialization`].
    pub async fn pop(&self) -> Result<Option<VerificationRequest>, SentinelError> {
        let (cache, name) = (Arc::clone(&self.cache), self.name.clone());
        match call_blocking(self.timeout, move || cache.pop(&name)).await? {
            Some(item) => Ok(Some(serde_json::from_str(&item)?)),
            None => Ok(None),
        }
    }
}
