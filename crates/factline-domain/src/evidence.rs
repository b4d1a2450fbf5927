//! Evidence retrieved for a claim

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credibility rating of an evidence source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Credibility {
    /// Health agencies, wire services, official bodies
    High,
    /// Reputable outlets and government sites
    Medium,
    /// Social media and blogs
    Low,
    /// Not rated
    #[default]
    Unknown,
}

impl Credibility {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Credibility::High => "high",
            Credibility::Medium => "medium",
            Credibility::Low => "low",
            Credibility::Unknown => "unknown",
        }
    }

    /// Parse a rating; anything unrecognised is `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Credibility::High,
            "medium" => Credibility::Medium,
            "low" => Credibility::Low,
            _ => Credibility::Unknown,
        }
    }
}

impl fmt::Display for Credibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate piece of evidence for (or against) a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCandidate {
    /// Identifier of the source document in the corpus
    pub source_id: String,

    /// Source title
    pub title: String,

    /// Source URL, if known
    pub url: Option<String>,

    /// Kind of source (e.g. "medical", "government", "fact_check", "news")
    pub source_type: String,

    /// Credibility rating
    pub credibility: Credibility,

    /// Matched text from the source
    pub excerpt: String,

    /// Relevance in [0, 1], derived from retrieval distance
    pub relevance: f64,

    /// Whether the source supports the claim (set by stance classification)
    pub supports: bool,
}

impl EvidenceCandidate {
    /// Relevance for a retrieval distance: `1 / (1 + distance)` clamped to [0, 1]
    ///
    /// Smaller distances are more relevant. Negative distances (possible with
    /// some similarity metrics) clamp to 1, and non-finite values map to 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use factline_domain::EvidenceCandidate;
    ///
    /// assert_eq!(EvidenceCandidate::relevance_from_distance(0.0), 1.0);
    /// assert_eq!(EvidenceCandidate::relevance_from_distance(1.0), 0.5);
    /// assert_eq!(EvidenceCandidate::relevance_from_distance(-0.5), 1.0);
    /// ```
    pub fn relevance_from_distance(distance: f64) -> f64 {
        if distance.is_nan() {
            return 0.0;
        }
        if distance <= 0.0 {
            return 1.0;
        }
        (1.0 / (1.0 + distance)).clamp(0.0, 1.0)
    }

    /// Whether this source is rated high credibility
    pub fn is_high_credibility(&self) -> bool {
        self.credibility == Credibility::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_monotonic() {
        let near = EvidenceCandidate::relevance_from_distance(0.1);
        let far = EvidenceCandidate::relevance_from_distance(2.0);
        assert!(near > far);
        assert!((0.0..=1.0).contains(&far));
    }

    #[test]
    fn test_relevance_non_finite() {
        assert_eq!(EvidenceCandidate::relevance_from_distance(f64::NAN), 0.0);
        assert_eq!(EvidenceCandidate::relevance_from_distance(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_credibility_parse() {
        assert_eq!(Credibility::parse("HIGH"), Credibility::High);
        assert_eq!(Credibility::parse(" medium "), Credibility::Medium);
        assert_eq!(Credibility::parse("trusted"), Credibility::Unknown);
    }

    proptest::proptest! {
        #[test]
        fn prop_relevance_in_unit_interval(distance in proptest::num::f64::ANY) {
            let relevance = EvidenceCandidate::relevance_from_distance(distance);
            proptest::prop_assert!((0.0..=1.0).contains(&relevance));
        }
    }
}
