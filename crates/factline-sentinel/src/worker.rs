//! Background worker draining the verification queue

use crate::config::SentinelConfig;
use crate::error::SentinelError;
use crate::metrics::SentinelMetrics;
use crate::queue::VerificationQueue;
use factline_domain::traits::CacheStore;
use factline_domain::VerificationResult;
use factline_store::call_blocking;
use factline_verifier::Verifier;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Background worker that verifies queued claims on a schedule
///
/// Each finished verdict is published as JSON on the verdict channel. A
/// request the verifier fails on is moved to the dead-letter queue so a
/// scheduler can retry it. Several workers may share one queue.
///
/// # Examples
///
/// ```no_run
/// use factline_sentinel::{SentinelConfig, VerificationWorker};
/// # async fn example(verifier: std::sync::Arc<factline_verifier::Verifier>) -> Result<(), Box<dyn std::error::Error>> {
/// let cache = std::sync::Arc::new(factline_store::MemoryCache::new());
/// let mut worker = VerificationWorker::new(verifier, cache, &SentinelConfig::default());
///
/// // Run until Ctrl+C
/// worker.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct VerificationWorker {
    verifier: Arc<Verifier>,
    cache: Arc<dyn CacheStore>,
    queue: VerificationQueue,
    dead_letter: VerificationQueue,
    verdict_channel: String,
    cache_timeout: Duration,
    interval: Duration,
    metrics: SentinelMetrics,
}

impl VerificationWorker {
    /// Create a worker over the queue named in `config`
    pub fn new(verifier: Arc<Verifier>, cache: Arc<dyn CacheStore>, config: &SentinelConfig) -> Self {
        let queue = VerificationQueue::new(
            Arc::clone(&cache),
            config.verification_queue.clone(),
            config.cache_timeout(),
        );
        let dead_letter = VerificationQueue::new(
            Arc::clone(&cache),
            config.dead_letter_queue.clone(),
            config.cache_timeout(),
        );
        Self {
            verifier,
            cache,
            queue,
            dead_letter,
            verdict_channel: config.verdict_channel.clone(),
            cache_timeout: config.cache_timeout(),
            interval: config.poll_interval(),
            metrics: SentinelMetrics::new(),
        }
    }

    /// Get current metrics
    pub fn metrics(&self) -> &SentinelMetrics {
        &self.metrics
    }

    /// Reset metrics
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Verify the oldest queued claim
    ///
    /// Returns `Ok(None)` when the queue is empty.
    ///
    /// # Errors
    ///
    /// - `SentinelError::Cache` when the queue cannot be read
    /// - `SentinelError::Serialization` for an undecodable item (it is dropped)
    /// - `SentinelError::Verification` when the verifier fails (the request
    ///   is moved to the dead-letter queue)
    pub async fn process_next(&mut self) -> Result<Option<VerificationResult>, SentinelError> {
        let request = match self.queue.pop().await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(None),
            Err(e @ SentinelError::Serialization(_)) => {
                self.metrics.record_failure();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            "verifying queued claim {} ({})",
            request.claim.claim_id,
            request.reason
        );
        let result = match self.verifier.verify(&request.claim).await {
            Ok(result) => result,
            Err(e) => {
                self.metrics.record_failure();
                match self.dead_letter.push(&request).await {
                    Ok(len) => {
                        self.metrics.record_dead_letter();
                        tracing::warn!(
                            "claim {} moved to {} ({} waiting): {}",
                            request.claim.claim_id,
                            self.dead_letter.name(),
                            len,
                            e
                        );
                    }
                    Err(push_err) => tracing::error!(
                        "claim {} lost, dead-letter queue unavailable: {}",
                        request.claim.claim_id,
                        push_err
                    ),
                }
                return Err(e.into());
            }
        };
        self.metrics.record_verdict(result.status);

        if let Err(e) = self.publish(&result).await {
            tracing::warn!("verdict publish for {} failed: {}", result.claim_id, e);
        }
        Ok(Some(result))
    }

    async fn publish(&self, result: &VerificationResult) -> Result<usize, SentinelError> {
        let message = serde_json::to_string(result)?;
        let (cache, channel) = (Arc::clone(&self.cache), self.verdict_channel.clone());
        Ok(call_blocking(self.cache_timeout, move || cache.publish(&channel, &message)).await?)
    }

    /// Verify queued claims until the queue is empty
    ///
    /// Failed items are counted and skipped. Returns the verdicts produced.
    ///
    /// # Errors
    ///
    /// Returns `SentinelError::Cache` if the queue becomes unreadable.
    pub async fn drain(&mut self) -> Result<Vec<VerificationResult>, SentinelError> {
        let mut verdicts = Vec::new();
        loop {
            match self.process_next().await {
                Ok(Some(result)) => verdicts.push(result),
                Ok(None) => break,
                Err(e @ SentinelError::Cache(_)) => return Err(e),
                Err(e) => tracing::error!("queued verification failed: {}", e),
            }
        }
        Ok(verdicts)
    }

    async fn cycle(&mut self) {
        match self.drain().await {
            Ok(verdicts) if !verdicts.is_empty() => {
                tracing::info!("Cycle completed: {} claims verified", verdicts.len());
            }
            Ok(_) => tracing::debug!("Cycle completed: queue empty"),
            Err(e) => tracing::error!("Cycle failed: {}", e),
        }
        self.metrics.record_cycle();
    }

    /// Run the worker until a shutdown signal (Ctrl+C) is received
    pub async fn run(&mut self) -> Result<(), SentinelError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Verification worker started on queue {} (interval: {:?})",
            self.queue.name(),
            self.interval
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.cycle().await,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping verification worker");
                    break;
                }
            }
        }

        tracing::info!("Verification worker stopped. Final metrics:\n{}", self.metrics.summary());
        Ok(())
    }

    /// Run for a specific number of cycles
    pub async fn run_cycles(&mut self, cycles: usize) -> Result<(), SentinelError> {
        let mut ticker = interval(self.interval);

        tracing::info!(
            "Verification worker started for {} cycles (interval: {:?})",
            cycles,
            self.interval
        );

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Starting cycle {}/{}", cycle + 1, cycles);
            self.cycle().await;
        }

        tracing::info!("Verification worker finished. Metrics:\n{}", self.metrics.summary());
        Ok(())
    }
}
