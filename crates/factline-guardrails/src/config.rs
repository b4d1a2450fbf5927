//! Guardrails configuration

use serde::{Deserialize, Serialize};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Thresholds and lexicons for the policy layer
///
/// Missing fields in a TOML section take their default values.
///
/// # Examples
///
/// ```
/// use factline_guardrails::GuardrailsConfig;
///
/// let config = GuardrailsConfig::default();
/// assert_eq!(config.low_confidence_threshold, 60.0);
///
/// let config = GuardrailsConfig::strict();
/// assert!(config.low_confidence_threshold > 60.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailsConfig {
    /// Below this confidence a verdict is blocked and sent to review
    pub low_confidence_threshold: f64,

    /// Below this confidence a false/misleading verdict is flagged
    pub high_confidence_threshold: f64,

    /// Substrings marking health, safety, political and emergency topics
    pub sensitive_topics: Vec<String>,

    /// Substrings that escalate to emergency urgency
    pub emergency_keywords: Vec<String>,

    /// Substrings marking a medical claim for source-sufficiency review
    pub medical_terms: Vec<String>,

    /// Minimum high-credibility sources behind a medical claim
    pub min_high_credibility_medical: usize,

    /// Share of classified sources one leaning may hold before flagging
    pub max_leaning_share: f64,

    /// Fewer distinct source types than this is low diversity...
    pub min_source_types: usize,

    /// ...once more than this many sources back the verdict
    pub diversity_source_floor: usize,

    /// Title words for left-leaning outlets
    pub left_outlets: Vec<String>,

    /// Title words for centrist outlets
    pub center_outlets: Vec<String>,

    /// Title words for right-leaning outlets
    pub right_outlets: Vec<String>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 60.0,
            high_confidence_threshold: 80.0,
            sensitive_topics: words(&[
                "medical",
                "health",
                "vaccine",
                "medication",
                "treatment",
                "emergency",
                "evacuation",
                "disaster",
                "terror",
                "attack",
                "election",
                "voting",
                "political",
                "government",
            ]),
            emergency_keywords: words(&["evacuation", "emergency", "immediate danger", "poisoned"]),
            medical_terms: words(&["medical", "vaccine", "treatment"]),
            min_high_credibility_medical: 2,
            max_leaning_share: 0.7,
            min_source_types: 2,
            diversity_source_floor: 3,
            left_outlets: words(&["guardian", "msnbc", "cnn"]),
            center_outlets: words(&["reuters", "ap", "bbc"]),
            right_outlets: words(&["fox", "breitbart"]),
        }
    }
}

impl GuardrailsConfig {
    /// Stricter gates: more verdicts go to review
    pub fn strict() -> Self {
        Self {
            low_confidence_threshold: 70.0,
            high_confidence_threshold: 90.0,
            min_high_credibility_medical: 3,
            max_leaning_share: 0.6,
            ..Self::default()
        }
    }

    /// Looser gates for low-stakes deployments
    pub fn permissive() -> Self {
        Self {
            low_confidence_threshold: 40.0,
            high_confidence_threshold: 70.0,
            min_high_credibility_medical: 1,
            max_leaning_share: 0.85,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.low_confidence_threshold) || !in_range(self.high_confidence_threshold) {
            return Err("confidence thresholds must be within [0, 100]".to_string());
        }
        if self.low_confidence_threshold > self.high_confidence_threshold {
            return Err(
                "low_confidence_threshold cannot exceed high_confidence_threshold".to_string(),
            );
        }
        if !(self.max_leaning_share > 0.0 && self.max_leaning_share <= 1.0) {
            return Err("max_leaning_share must be within (0, 1]".to_string());
        }
        if self.min_source_types == 0 {
            return Err("min_source_types must be greater than 0".to_string());
        }
        Ok(())
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
    fn test_presets_are_valid() {
        assert!(GuardrailsConfig::default().validate().is_ok());
        assert!(GuardrailsConfig::strict().validate().is_ok());
        assert!(GuardrailsConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = GuardrailsConfig {
            low_confidence_threshold: 90.0,
            high_confidence_threshold: 80.0,
            ..GuardrailsConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config = GuardrailsConfig::from_toml("low_confidence_threshold = 55.0").unwrap();
        assert_eq!(config.low_confidence_threshold, 55.0);
        assert_eq!(config.high_confidence_threshold, 80.0);
        assert!(config.emergency_keywords.contains(&"poisoned".to_string()));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = GuardrailsConfig::strict();
        let parsed = GuardrailsConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
