//! Metrics collection for Sentinel operations

use crate::EscalationReason;
use factline_domain::VerificationStatus;
use std::collections::HashMap;

/// Counters for observed mentions, escalations and queued verifications
#[derive(Debug, Clone, Default)]
pub struct SentinelMetrics {
    /// Mentions observed
    pub mentions: usize,

    /// Mentions whose velocity could not be read
    pub unknown_velocity: usize,

    /// Escalations per reason
    pub escalations: HashMap<EscalationReason, usize>,

    /// Requests pushed onto the verification queue
    pub queued: usize,

    /// Escalations that could not be queued
    pub queue_failures: usize,

    /// Verdicts produced by the worker, per status
    pub verdicts: HashMap<VerificationStatus, usize>,

    /// Queued claims that failed verification or could not be decoded
    pub failed: usize,

    /// Failed requests moved to the dead-letter queue
    pub dead_lettered: usize,

    /// Worker cycles completed
    pub cycles: usize,
}

impl SentinelMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observed mention
    pub fn record_mention(&mut self, velocity_known: bool) {
        self.mentions += 1;
        if !velocity_known {
            self.unknown_velocity += 1;
        }
    }

    /// Record an escalation and whether it reached the queue
    pub fn record_escalation(&mut self, reason: EscalationReason, queued: bool) {
        *self.escalations.entry(reason).or_insert(0) += 1;
        if queued {
            self.queued += 1;
        } else {
            self.queue_failures += 1;
        }
    }

    /// Record a finished verification
    pub fn record_verdict(&mut self, status: VerificationStatus) {
        *self.verdicts.entry(status).or_insert(0) += 1;
    }

    /// Record a queued claim that produced no verdict
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Record a failed request parked for a later retry
    pub fn record_dead_letter(&mut self) {
        self.dead_lettered += 1;
    }

    /// Record a worker cycle
    pub fn record_cycle(&mut self) {
        self.cycles += 1;
    }

    /// Total escalations across reasons
    pub fn total_escalations(&self) -> usize {
        self.escalations.values().sum()
    }

    /// Total verdicts across statuses
    pub fn total_verified(&self) -> usize {
        self.verdicts.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Sentinel Metrics Summary".to_string(),
            "========================".to_string(),
            format!("Mentions observed: {}", self.mentions),
            format!("Unknown velocity: {}", self.unknown_velocity),
            format!("Worker cycles: {}", self.cycles),
            String::new(),
        ];

        if !self.escalations.is_empty() {
            lines.push("Escalations by reason:".to_string());
            let mut reasons: Vec<_> = self.escalations.iter().collect();
            reasons.sort_by_key(|(reason, _)| reason.as_str());
            for (reason, count) in reasons {
                lines.push(format!("  {}: {}", reason, count));
            }
            lines.push(format!("  Total: {} ({} queued, {} not queued)", self.total_escalations(), self.queued, self.queue_failures));
            lines.push(String::new());
        }

        if !self.verdicts.is_empty() || self.failed > 0 {
            lines.push("Verdicts:".to_string());
            let mut statuses: Vec<_> = self.verdicts.iter().map(|(s, c)| (s.to_string(), *c)).collect();
            statuses.sort();
            for (status, count) in statuses {
                lines.push(format!("  {}: {}", status, count));
            }
            lines.push(format!("  Total: {}", self.total_verified()));
            lines.push(format!("  Failed: {} ({} dead-lettered)", self.failed, self.dead_lettered));
        }

        lines.join("\n")
    }
}
