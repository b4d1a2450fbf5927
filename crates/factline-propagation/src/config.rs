//! Configuration for propagation analysis
//!
//! Traversal depths, amplifier and coordination thresholds, and the graph
//! call deadline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the propagation engine
///
/// # Examples
///
/// ```
/// use factline_propagation::PropagationConfig;
///
/// // Default thresholds
/// let config = PropagationConfig::default();
/// assert_eq!(config.max_depth, 5);
/// assert_eq!(config.amplifier_min_followers, 10_000);
///
/// // Catch smaller coordinated groups
/// let config = PropagationConfig::aggressive();
/// assert_eq!(config.cluster_min_users, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Default depth of the reported propagation tree
    /// Default: 5 hops
    pub max_depth: usize,

    /// Deepest reshare that can make a user an amplifier
    /// Default: 3 hops
    pub amplifier_max_depth: usize,

    /// Followers a user must exceed to count as an amplifier
    /// Default: 10,000
    pub amplifier_min_followers: u64,

    /// Amplifiers reported per origin
    /// Default: 20
    pub amplifier_limit: usize,

    /// Posts a user must exceed inside one window to be a burst poster
    /// Default: 20
    pub burst_threshold: usize,

    /// Sliding window for burst detection (seconds)
    /// Default: 3600
    pub burst_window_secs: u64,

    /// How far back burst detection looks (seconds)
    /// Default: 24 hours
    pub burst_lookback_secs: u64,

    /// Burst posters reported
    /// Default: 50
    pub burst_limit: usize,

    /// Distinct users needed to report an identical-text cluster
    /// Default: 5
    pub cluster_min_users: usize,

    /// Clusters reported
    /// Default: 20
    pub cluster_limit: usize,

    /// Deadline for each graph section (seconds)
    /// Default: 10
    pub graph_timeout_secs: u64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            amplifier_max_depth: 3,
            amplifier_min_followers: 10_000,
            amplifier_limit: 20,
            burst_threshold: 20,
            burst_window_secs: 3600,
            burst_lookback_secs: 86_400,
            burst_limit: 50,
            cluster_min_users: 5,
            cluster_limit: 20,
            graph_timeout_secs: 10,
        }
    }
}

impl PropagationConfig {
    /// Lower thresholds, for active incidents
    pub fn aggressive() -> Self {
        Self {
            amplifier_min_followers: 5_000,
            amplifier_limit: 50,
            burst_threshold: 10,
            burst_limit: 100,
            cluster_min_users: 3,
            cluster_limit: 50,
            ..Self::default()
        }
    }

    /// Higher thresholds, for noisy platforms
    pub fn lenient() -> Self {
        Self {
            amplifier_min_followers: 50_000,
            amplifier_limit: 10,
            burst_threshold: 40,
            burst_limit: 25,
            cluster_min_users: 10,
            cluster_limit: 10,
            graph_timeout_secs: 30,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 || self.amplifier_max_depth == 0 {
            return Err("depths must be greater than 0".to_string());
        }
        if self.burst_window_secs == 0 || self.graph_timeout_secs == 0 {
            return Err("windows and timeouts must be greater than 0".to_string());
        }
        if self.cluster_min_users < 2 {
            return Err("cluster_min_users must be at least 2".to_string());
        }
        Ok(())
    }

    /// Burst window as Duration
    pub fn burst_window(&self) -> Duration {
        Duration::from_secs(self.burst_window_secs)
    }

    /// Burst lookback as Duration
    pub fn burst_lookback(&self) -> Duration {
        Duration::from_secs(self.burst_lookback_secs)
    }

    /// Graph call deadline
    pub fn graph_timeout(&self) -> Duration {
        Duration::from_secs(self.graph_timeout_secs)
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
        let config = PropagationConfig::default();
        assert_eq!(config.amplifier_max_depth, 3);
        assert_eq!(config.burst_threshold, 20);
        assert_eq!(config.burst_window(), Duration::from_secs(3600));
        assert_eq!(config.burst_lookback(), Duration::from_secs(86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let aggressive = PropagationConfig::aggressive();
        let lenient = PropagationConfig::lenient();
        assert!(aggressive.burst_threshold < lenient.burst_threshold);
        assert!(aggressive.validate().is_ok());
        assert!(lenient.validate().is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = PropagationConfig {
            max_depth: 0,
            ..PropagationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config = PropagationConfig::from_toml("cluster_min_users = 8").unwrap();
        assert_eq!(config.cluster_min_users, 8);
        assert_eq!(config.max_depth, 5);
    }
}
