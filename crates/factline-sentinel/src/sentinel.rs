//! Mention intake and escalation

use crate::config::SentinelConfig;
use crate::error::SentinelError;
use crate::metrics::SentinelMetrics;
use crate::queue::{VerificationQueue, VerificationRequest};
use crate::velocity::{VelocitySnapshot, VelocityTracker};
use factline_domain::traits::CacheStore;
use factline_domain::{now_secs, Claim, Fingerprint, Priority, PropagationReport};
use factline_guardrails::{Guardrails, Urgency};
use factline_propagation::{PostRecord, PropagationEngine};
use factline_store::call_blocking;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Why a claim was sent for verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// Mention count just crossed the trending threshold
    Trending,
    /// First sighting of a P0 claim
    ImminentHarm,
    /// First sighting of a claim with emergency language
    Emergency,
}

impl EscalationReason {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationReason::Trending => "trending",
            EscalationReason::ImminentHarm => "imminent_harm",
            EscalationReason::Emergency => "emergency",
        }
    }
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sighting of a claim, optionally with the post it appeared in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    /// The claim mentioned
    pub claim: Claim,
    /// Post carrying the mention
    #[serde(default)]
    pub post: Option<PostRecord>,
}

/// Message published on the alert channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Escalated claim text
    pub claim_text: String,
    /// Claim fingerprint
    pub fingerprint: Fingerprint,
    /// Claim priority
    pub priority: Priority,
    /// Why it escalated
    pub reason: EscalationReason,
    /// Mention count, if known
    pub velocity: Option<u64>,
    /// Earliest known post, when a trace ran
    pub patient_zero_post_id: Option<String>,
    /// Unix seconds
    pub raised_at: u64,
}

/// What observing one mention did
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Velocity after this mention
    pub velocity: VelocitySnapshot,
    /// Escalation raised by this mention
    pub escalation: Option<EscalationReason>,
    /// Verification request reached the queue
    pub queued: bool,
    /// Trace run for a trending claim
    pub propagation: Option<PropagationReport>,
    /// Steps that degraded
    pub diagnostics: Vec<String>,
}

/// Watches incoming mentions and escalates claims for verification
pub struct Sentinel {
    config: SentinelConfig,
    cache: Arc<dyn CacheStore>,
    guardrails: Arc<Guardrails>,
    tracker: VelocityTracker,
    queue: VerificationQueue,
    propagation: Option<Arc<PropagationEngine>>,
    metrics: SentinelMetrics,
}

impl Sentinel {
    /// Create a sentinel over `cache`
    pub fn new(
        cache: Arc<dyn CacheStore>,
        guardrails: Arc<Guardrails>,
        config: SentinelConfig,
    ) -> Result<Self, SentinelError> {
        config.validate().map_err(SentinelError::Config)?;
        let tracker = VelocityTracker::new(
            Arc::clone(&cache),
            config.velocity_window(),
            config.trending_threshold,
            config.cache_timeout(),
        );
        let queue = VerificationQueue::new(
            Arc::clone(&cache),
            config.verification_queue.clone(),
            config.cache_timeout(),
        );
        Ok(Self {
            config,
            cache,
            guardrails,
            tracker,
            queue,
            propagation: None,
            metrics: SentinelMetrics::new(),
        })
    }

    /// Feed mention posts into the graph and trace trending claims
    pub fn with_propagation(mut self, engine: Arc<PropagationEngine>) -> Self {
        self.propagation = Some(engine);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// Velocity tracker
    pub fn tracker(&self) -> &VelocityTracker {
        &self.tracker
    }

    /// Verification queue
    pub fn queue(&self) -> &VerificationQueue {
        &self.queue
    }

    /// Get current metrics
    pub fn metrics(&self) -> &SentinelMetrics {
        &self.metrics
    }

    /// Reset metrics
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    fn escalation_for(&self, claim: &Claim, velocity: &VelocitySnapshot) -> Option<EscalationReason> {
        let threshold = self.tracker.threshold();
        if velocity.count == Some(threshold.saturating_add(1)) {
            return Some(EscalationReason::Trending);
        }
        if !velocity.is_first_sighting() {
            return None;
        }
        if claim.priority == Priority::P0 {
            return Some(EscalationReason::ImminentHarm);
        }
        if self.guardrails.precautionary(&claim.text, None) == Urgency::Emergency {
            return Some(EscalationReason::Emergency);
        }
        None
    }

    /// Record a mention and escalate its claim if warranted
    ///
    /// Never fails: graph, cache and queue problems are logged and listed in
    /// the observation's diagnostics.
    pub async fn observe(&mut self, mention: Mention) -> Observation {
        let Mention { claim, post } = mention;
        let mut diagnostics = Vec::new();

        if let (Some(engine), Some(record)) = (&self.propagation, post) {
            if let Err(e) = engine.ingest(record).await {
                warn!("graph ingest failed: {}", e);
                diagnostics.push(format!("graph ingest failed: {}", e));
            }
        }

        let velocity = self.tracker.record_mention(&claim.fingerprint()).await;
        self.metrics.record_mention(velocity.count.is_some());
        if velocity.count.is_none() {
            diagnostics.push("velocity unknown: cache unavailable".to_string());
        }

        let Some(reason) = self.escalation_for(&claim, &velocity) else {
            return Observation {
                velocity,
                escalation: None,
                queued: false,
                propagation: None,
                diagnostics,
            };
        };

        info!(
            "escalating claim {} ({}, velocity {:?})",
            claim.claim_id, reason, velocity.count
        );

        let propagation = match &self.propagation {
            Some(engine) if self.config.trace_on_escalation => {
                let max_depth = engine.config().max_depth;
                match engine.trace_claim(&claim.text, max_depth).await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!("trace of escalated claim failed: {}", e);
                        diagnostics.push(format!("propagation trace failed: {}", e));
                        None
                    }
                }
            }
            _ => None,
        };

        let now = now_secs();
        let request = VerificationRequest {
            claim: claim.clone(),
            reason,
            velocity: velocity.count,
            requested_at: now,
        };
        let queued = match self.queue.push(&request).await {
            Ok(len) => {
                info!("queued verification of {} ({} waiting)", claim.claim_id, len);
                true
            }
            Err(e) => {
                warn!("could not queue verification of {}: {}", claim.claim_id, e);
                diagnostics.push(format!("verification queue unavailable: {}", e));
                false
            }
        };
        self.metrics.record_escalation(reason, queued);

        let alert = Alert {
            claim_text: claim.text.clone(),
            fingerprint: velocity.fingerprint.clone(),
            priority: claim.priority,
            reason,
            velocity: velocity.count,
            patient_zero_post_id: propagation
                .as_ref()
                .and_then(|r| r.patient_zero.as_ref())
                .map(|pz| pz.post.post_id.clone()),
            raised_at: now,
        };
        if let Err(e) = self.publish_alert(&alert).await {
            warn!("alert publish failed: {}", e);
            diagnostics.push(format!("alert publish failed: {}", e));
        }

        Observation {
            velocity,
            escalation: Some(reason),
            queued,
            propagation,
            diagnostics,
        }
    }

    async fn publish_alert(&self, alert: &Alert) -> Result<usize, SentinelError> {
        let message = serde_json::to_string(alert)?;
        let (cache, channel) = (Arc::clone(&self.cache), self.config.alert_channel.clone());
        Ok(call_blocking(self.config.cache_timeout(), move || cache.publish(&channel, &message)).await?)
    }
}
