//! Configuration for the Sentinel
//!
//! Velocity window and threshold, queue and channel names, worker polling.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for mention tracking and the verification worker
///
/// # Examples
///
/// ```
/// use factline_sentinel::SentinelConfig;
///
/// let config = SentinelConfig::default();
/// assert_eq!(config.velocity_window_secs, 3600);
/// assert_eq!(config.trending_threshold, 500);
///
/// // Escalate earlier during an incident
/// let config = SentinelConfig::aggressive();
/// assert_eq!(config.trending_threshold, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    /// Velocity counter window (seconds)
    /// Default: 3600
    pub velocity_window_secs: u64,

    /// Mentions per window a claim must exceed to be trending
    /// Default: 500
    pub trending_threshold: u64,

    /// Cache call deadline (milliseconds)
    /// Default: 500
    pub cache_timeout_ms: u64,

    /// FIFO queue holding deferred verification requests
    /// Default: "verification"
    pub verification_queue: String,

    /// FIFO holding requests whose verification failed, for a later retry
    /// Default: "verification:dead"
    pub dead_letter_queue: String,

    /// Channel escalation alerts are published on
    /// Default: "alerts"
    pub alert_channel: String,

    /// Channel finished verdicts are published on
    /// Default: "verdicts"
    pub verdict_channel: String,

    /// Trace propagation whenever a claim is escalated
    /// Default: true
    pub trace_on_escalation: bool,

    /// How often the worker drains the queue (seconds)
    /// Default: 5
    pub poll_interval_secs: u64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            velocity_window_secs: 3600,
            trending_threshold: 500,
            cache_timeout_ms: 500,
            verification_queue: "verification".to_string(),
            dead_letter_queue: "verification:dead".to_string(),
            alert_channel: "alerts".to_string(),
            verdict_channel: "verdicts".to_string(),
            trace_on_escalation: true,
            poll_interval_secs: 5,
        }
    }
}

impl SentinelConfig {
    /// Lower threshold and faster polling, for active incidents
    pub fn aggressive() -> Self {
        Self {
            trending_threshold: 100,
            poll_interval_secs: 1,
            ..Self::default()
        }
    }

    /// Higher threshold and slower polling, for quiet periods
    pub fn lenient() -> Self {
        Self {
            trending_threshold: 2_000,
            cache_timeout_ms: 2_000,
            poll_interval_secs: 30,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.velocity_window_secs == 0 {
            return Err("velocity_window_secs must be greater than 0".to_string());
        }
        if self.cache_timeout_ms == 0 || self.poll_interval_secs == 0 {
            return Err("timeouts and intervals must be greater than 0".to_string());
        }
        if self.verification_queue.is_empty()
            || self.dead_letter_queue.is_empty()
            || self.alert_channel.is_empty()
            || self.verdict_channel.is_empty()
        {
            return Err("queue and channel names must not be empty".to_string());
        }
        if self.dead_letter_queue == self.verification_queue {
            return Err("dead_letter_queue must differ from verification_queue".to_string());
        }
        Ok(())
    }

    /// Velocity window as Duration
    pub fn velocity_window(&self) -> Duration {
        Duration::from_secs(self.velocity_window_secs)
    }

    /// Cache call deadline
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    /// Worker polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SentinelConfig::default();
        assert_eq!(config.velocity_window(), Duration::from_secs(3600));
        assert_eq!(config.verification_queue, "verification");
        assert!(config.trace_on_escalation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(SentinelConfig::aggressive().trending_threshold < SentinelConfig::lenient().trending_threshold);
        assert!(SentinelConfig::aggressive().validate().is_ok());
        assert!(SentinelConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_empty_queue_name_rejected() {
        let config = SentinelConfig {
            verification_queue: String::new(),
            ..SentinelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dead_letter_queue_must_be_separate() {
        let config = SentinelConfig {
            dead_letter_queue: "verification".to_string(),
            ..SentinelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SentinelConfig::aggressive();
        let parsed = SentinelConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
