//! Verification verdicts

use crate::{Claim, ClaimId, EvidenceCandidate, Fingerprint, Priority};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Evidence supports the claim
    True,
    /// Evidence contradicts the claim
    False,
    /// Evidence is mixed
    Misleading,
    /// Not enough evidence to decide
    Unverified,
    /// Was accurate once, no longer is
    Outdated,
}

impl VerificationStatus {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::True => "true",
            VerificationStatus::False => "false",
            VerificationStatus::Misleading => "misleading",
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::Outdated => "outdated",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strongly the evidence agrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusType {
    /// At least 90% on one side
    Unanimous,
    /// At least 70% on one side
    Majority,
    /// No clear side
    Split,
    /// No evidence at all
    None,
}

impl ConsensusType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsensusType::Unanimous => "unanimous",
            ConsensusType::Majority => "majority",
            ConsensusType::Split => "split",
            ConsensusType::None => "none",
        }
    }
}

impl fmt::Display for ConsensusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one verification run
///
/// Created once per run and never mutated afterwards. Serialized as JSON into
/// the verification cache under [`VerificationResult::cache_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Claim this verdict is for
    pub claim_id: ClaimId,

    /// Claim text as verified
    pub claim_text: String,

    /// Claim priority at verification time
    pub priority: Priority,

    /// Verdict
    pub status: VerificationStatus,

    /// Confidence in [0, 100]
    pub confidence: f64,

    /// Stance-labelled evidence
    pub sources: Vec<EvidenceCandidate>,

    /// Number of supporting sources
    pub supporting_count: usize,

    /// Number of contradicting sources
    pub contradicting_count: usize,

    /// Agreement among sources
    pub consensus_type: ConsensusType,

    /// Short reader-facing explanation
    pub explanation: String,

    /// Whether a human must review this verdict before it is relied on
    pub expert_review_required: bool,

    /// First reason that triggered review, if any
    #[serde(default)]
    pub review_reason: Option<String>,

    /// Degradations encountered during the run (classifier fallbacks, cache misses)
    #[serde(default)]
    pub diagnostics: Vec<String>,

    /// Unix seconds when the verdict was produced
    pub verified_at: u64,
}

impl VerificationResult {
    /// Terminal result for a claim with no retrievable evidence
    pub fn no_evidence(claim: &Claim, verified_at: u64) -> Self {
        Self {
            claim_id: claim.claim_id,
            claim_text: claim.text.clone(),
            priority: claim.priority,
            status: VerificationStatus::Unverified,
            confidence: 0.0,
            sources: Vec::new(),
            supporting_count: 0,
            contradicting_count: 0,
            consensus_type: ConsensusType::None,
            explanation: "No authoritative sources were found for this claim yet.".to_string(),
            expert_review_required: false,
            review_reason: None,
            diagnostics: Vec::new(),
            verified_at,
        }
    }

    /// Cache key for a fingerprint: `verification:{fingerprint}`
    pub fn cache_key(fingerprint: &Fingerprint) -> String {
        format!("verification:{}", fingerprint)
    }

    /// Number of high-credibility sources
    pub fn high_credibility_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_high_credibility()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fingerprint, ClaimCategory};

    #[test]
    fn test_no_evidence_result() {
        let claim = Claim::new("Bridge closed", ClaimCategory::Other);
        let result = VerificationResult::no_evidence(&claim, 42);
        assert_eq!(result.status, VerificationStatus::Unverified);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.consensus_type, ConsensusType::None);
        assert!(result.sources.is_empty());
        assert_eq!(result.verified_at, 42);
    }

    #[test]
    fn test_cache_key_format() {
        let fp = fingerprint("abc");
        assert_eq!(VerificationResult::cache_key(&fp), format!("verification:{}", fp.as_str()));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&VerificationStatus::Misleading).unwrap();
        assert_eq!(json, "\"misleading\"");
        let json = serde_json::to_string(&ConsensusType::None).unwrap();
        assert_eq!(json, "\"none\"");
    }
}
