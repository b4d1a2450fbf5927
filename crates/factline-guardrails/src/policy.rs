//! Verdict policy checks

use crate::{GuardrailsConfig, GuardrailsError, PrivacyScanner};
use factline_domain::{
    ConsensusType, EvidenceCandidate, Priority, VerificationResult, VerificationStatus,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Outcome of the confidence gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Safe to publish automatically
    Publish,
    /// Publish, but flag for a reviewer
    Flag,
    /// Hold for expert review
    Block,
}

impl GateDecision {
    /// Reviewer-facing reason, if the verdict is not a plain publish
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            GateDecision::Publish => None,
            GateDecision::Flag => Some("Moderate confidence - flagged for review"),
            GateDecision::Block => Some("Confidence too low - requires expert review"),
        }
    }
}

/// Precautionary review urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    /// No precautionary flag
    None,
    /// Sensitive topic without a settled verdict
    Review,
    /// Emergency language; reviewed first regardless of verdict
    Emergency,
}

impl Urgency {
    /// Reviewer-facing reason
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Urgency::None => None,
            Urgency::Review => Some("Sensitive topic without a verdict - precautionary review"),
            Urgency::Emergency => Some("Emergency keywords - highest urgency review"),
        }
    }
}

/// Why a verdict was routed to an expert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    /// Confidence below the low threshold
    LowConfidence,
    /// Sources split on the claim
    ConflictingEvidence,
    /// P0 claim
    ImminentHarm,
    /// Medical claim with too few high-credibility sources
    MedicalInsufficientSources,
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReviewReason::LowConfidence => "Low confidence score",
            ReviewReason::ConflictingEvidence => "Conflicting evidence from sources",
            ReviewReason::ImminentHarm => "P0 priority claim - potential imminent harm",
            ReviewReason::MedicalInsufficientSources => {
                "Medical claim with insufficient high-credibility sources"
            }
        };
        f.write_str(text)
    }
}

/// Coarse political-leaning tally over source titles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoliticalBalance {
    /// Left-leaning outlets
    pub left: usize,
    /// Centrist outlets
    pub center: usize,
    /// Right-leaning outlets
    pub right: usize,
}

impl PoliticalBalance {
    /// Sources with any leaning
    pub fn classified(&self) -> usize {
        self.left + self.center + self.right
    }

    /// Largest single leaning as a share of classified sources
    pub fn dominant_share(&self) -> Option<f64> {
        let total = self.classified();
        if total == 0 {
            return None;
        }
        let max = self.left.max(self.center).max(self.right);
        Some(max as f64 / total as f64)
    }
}

/// Result of the source audit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasAudit {
    /// Any warning raised
    pub bias_detected: bool,
    /// Human-readable warnings
    pub warnings: Vec<String>,
    /// Sources per source type
    pub source_distribution: BTreeMap<String, usize>,
    /// Leaning tally
    pub political_balance: PoliticalBalance,
}

/// Every policy outcome for one verdict
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyReport {
    /// Confidence gate
    pub gate: GateDecision,
    /// Precautionary urgency
    pub urgency: Urgency,
    /// Source audit
    pub audit: BiasAudit,
    /// First matching expert-review rule
    pub review: Option<ReviewReason>,
}

impl PolicyReport {
    /// Whether a human must look at the verdict before it goes out
    pub fn requires_review(&self) -> bool {
        self.review.is_some() || self.gate == GateDecision::Block || self.urgency != Urgency::None
    }

    /// Most urgent reason to show a reviewer
    pub fn review_summary(&self) -> Option<String> {
        if self.urgency == Urgency::Emergency {
            return self.urgency.reason().map(str::to_string);
        }
        if let Some(reason) = self.review {
            return Some(reason.to_string());
        }
        self.gate
            .reason()
            .filter(|_| self.gate == GateDecision::Block)
            .or_else(|| self.urgency.reason())
            .map(str::to_string)
    }
}

/// The policy layer
pub struct Guardrails {
    config: GuardrailsConfig,
    privacy: PrivacyScanner,
}

impl Guardrails {
    /// Build from a validated configuration
    pub fn new(config: GuardrailsConfig) -> Result<Self, GuardrailsError> {
        config.validate().map_err(GuardrailsError::Config)?;
        Ok(Self {
            config,
            privacy: PrivacyScanner::new()?,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &GuardrailsConfig {
        &self.config
    }

    /// PII scanner
    pub fn privacy(&self) -> &PrivacyScanner {
        &self.privacy
    }

    /// Confidence gate
    pub fn check_confidence(&self, confidence: f64, status: VerificationStatus) -> GateDecision {
        if confidence < self.config.low_confidence_threshold {
            return GateDecision::Block;
        }
        let damning = matches!(status, VerificationStatus::False | VerificationStatus::Misleading);
        if confidence < self.config.high_confidence_threshold && damning {
            return GateDecision::Flag;
        }
        GateDecision::Publish
    }

    fn mentions(text: &str, terms: &[String]) -> bool {
        let lower = text.to_lowercase();
        terms.iter().any(|t| lower.contains(t.as_str()))
    }

    /// Precautionary principle
    ///
    /// Emergency language wins over everything else. Sensitive topics are
    /// flagged when no verdict exists yet or the verdict is `unverified`.
    pub fn precautionary(&self, text: &str, verdict: Option<VerificationStatus>) -> Urgency {
        if Self::mentions(text, &self.config.emergency_keywords) {
            return Urgency::Emergency;
        }
        let unsettled = matches!(verdict, None | Some(VerificationStatus::Unverified));
        if unsettled && Self::mentions(text, &self.config.sensitive_topics) {
            return Urgency::Review;
        }
        Urgency::None
    }

    fn title_has_word(title_words: &BTreeSet<String>, outlets: &[String]) -> bool {
        outlets.iter().any(|o| title_words.contains(o.as_str()))
    }

    /// Source-type distribution and leaning balance
    pub fn audit_sources(&self, sources: &[EvidenceCandidate]) -> BiasAudit {
        let mut audit = BiasAudit::default();

        for source in sources {
            *audit
                .source_distribution
                .entry(source.source_type.clone())
                .or_insert(0) += 1;

            let title_words: BTreeSet<String> = source
                .title
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect();

            let balance = &mut audit.political_balance;
            if Self::title_has_word(&title_words, &self.config.left_outlets) {
                balance.left += 1;
            } else if Self::title_has_word(&title_words, &self.config.center_outlets) {
                balance.center += 1;
            } else if Self::title_has_word(&title_words, &self.config.right_outlets) {
                balance.right += 1;
            }
        }

        if let Some(share) = audit.political_balance.dominant_share() {
            if share > self.config.max_leaning_share {
                audit
                    .warnings
                    .push("Political bias detected in source selection".to_string());
            }
        }

        if audit.source_distribution.len() < self.config.min_source_types
            && sources.len() > self.config.diversity_source_floor
        {
            audit
                .warnings
                .push("Low source diversity - consider broader sources".to_string());
        }

        audit.bias_detected = !audit.warnings.is_empty();
        audit
    }

    /// Expert-review routing; the first matching rule is reported
    pub fn requires_expert_review(
        &self,
        result: &VerificationResult,
        claim_text: &str,
    ) -> (bool, Option<ReviewReason>) {
        let reason = if result.confidence < self.config.low_confidence_threshold {
            Some(ReviewReason::LowConfidence)
        } else if result.consensus_type == ConsensusType::Split {
            Some(ReviewReason::ConflictingEvidence)
        } else if result.priority == Priority::P0 {
            Some(ReviewReason::ImminentHarm)
        } else if Self::mentions(claim_text, &self.config.medical_terms)
            && result.high_credibility_count() < self.config.min_high_credibility_medical
        {
            Some(ReviewReason::MedicalInsufficientSources)
        } else {
            None
        };
        (reason.is_some(), reason)
    }

    /// Run every check against a finished verdict
    pub fn evaluate(&self, result: &VerificationResult) -> PolicyReport {
        let report = PolicyReport {
            gate: self.check_confidence(result.confidence, result.status),
            urgency: self.precautionary(&result.claim_text, Some(result.status)),
            audit: self.audit_sources(&result.sources),
            review: self.requires_expert_review(result, &result.claim_text).1,
        };
        debug!(
            "policy for {}: gate={:?} urgency={:?} review={:?}",
            result.claim_id, report.gate, report.urgency, report.review
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::{Claim, ClaimCategory, Credibility};
    use proptest::prelude::*;

    fn guardrails() -> Guardrails {
        Guardrails::new(GuardrailsConfig::default()).unwrap()
    }

    fn source(title: &str, source_type: &str, credibility: Credibility) -> EvidenceCandidate {
        EvidenceCandidate {
            source_id: title.to_string(),
            title: title.to_string(),
            url: None,
            source_type: source_type.to_string(),
            credibility,
            excerpt: String::new(),
            relevance: 1.0,
            supports: false,
        }
    }

    fn result(text: &str, confidence: f64, consensus: ConsensusType) -> VerificationResult {
        let claim = Claim::new(text, ClaimCategory::Other);
        let mut result = VerificationResult::no_evidence(&claim, 0);
        result.confidence = confidence;
        result.consensus_type = consensus;
        result.status = VerificationStatus::False;
        result
    }

    #[test]
    fn test_confidence_gate_bands() {
        let g = guardrails();
        assert_eq!(g.check_confidence(59.9, VerificationStatus::True), GateDecision::Block);
        assert_eq!(g.check_confidence(70.0, VerificationStatus::False), GateDecision::Flag);
        assert_eq!(g.check_confidence(70.0, VerificationStatus::Misleading), GateDecision::Flag);
        assert_eq!(g.check_confidence(70.0, VerificationStatus::True), GateDecision::Publish);
        assert_eq!(g.check_confidence(80.0, VerificationStatus::False), GateDecision::Publish);
    }

    #[test]
    fn test_emergency_wins_regardless_of_verdict() {
        let g = guardrails();
        let text = "Immediate danger: reservoir poisoned";
        assert_eq!(g.precautionary(text, Some(VerificationStatus::True)), Urgency::Emergency);
        assert_eq!(g.precautionary(text, None), Urgency::Emergency);
    }

    #[test]
    fn test_sensitive_topic_only_when_unsettled() {
        let g = guardrails();
        let text = "New vaccine changes your DNA";
        assert_eq!(g.precautionary(text, None), Urgency::Review);
        assert_eq!(g.precautionary(text, Some(VerificationStatus::Unverified)), Urgency::Review);
        assert_eq!(g.precautionary(text, Some(VerificationStatus::False)), Urgency::None);
        assert_eq!(g.precautionary("Cats prefer boxes", None), Urgency::None);
    }

    #[test]
    fn test_bias_audit_dominant_leaning() {
        let g = guardrails();
        let sources = vec![
            source("CNN report", "news", Credibility::Medium),
            source("The Guardian live blog", "news", Credibility::Medium),
            source("MSNBC segment", "news", Credibility::Medium),
            source("Reuters fact check", "fact_check", Credibility::High),
        ];
        let audit = g.audit_sources(&sources);
        assert_eq!(audit.political_balance, PoliticalBalance { left: 3, center: 1, right: 0 });
        assert!(audit.bias_detected);
        assert_eq!(audit.warnings, vec!["Political bias detected in source selection"]);
    }

    #[test]
    fn test_bias_audit_whole_words_only() {
        let g = guardrails();
        // "ap" inside "apple" and "fox" inside "foxglove" are not outlets
        let sources = vec![
            source("Apple harvest update", "news", Credibility::Low),
            source("Foxglove poisoning facts", "medical", Credibility::High),
        ];
        let audit = g.audit_sources(&sources);
        assert_eq!(audit.political_balance.classified(), 0);
        assert!(!audit.bias_detected);
    }

    #[test]
    fn test_bias_audit_low_diversity() {
        let g = guardrails();
        let sources: Vec<_> = (0..4)
            .map(|i| source(&format!("Bulletin {}", i), "government", Credibility::High))
            .collect();
        let audit = g.audit_sources(&sources);
        assert_eq!(audit.source_distribution.get("government"), Some(&4));
        assert_eq!(audit.warnings, vec!["Low source diversity - consider broader sources"]);

        // Three sources of one type is fine
        assert!(!g.audit_sources(&sources[..3]).bias_detected);
    }

    #[test]
    fn test_review_reason_order() {
        let g = guardrails();

        let low = result("anything", 10.0, ConsensusType::Split);
        assert_eq!(g.requires_expert_review(&low, "anything"), (true, Some(ReviewReason::LowConfidence)));

        let split = result("anything", 75.0, ConsensusType::Split);
        assert_eq!(g.requires_expert_review(&split, "anything").1, Some(ReviewReason::ConflictingEvidence));

        let mut p0 = result("shelter in place now", 75.0, ConsensusType::Majority);
        p0.priority = Priority::P0;
        assert_eq!(g.requires_expert_review(&p0, &p0.claim_text.clone()).1, Some(ReviewReason::ImminentHarm));

        let mut medical = result("vaccine microchips", 90.0, ConsensusType::Unanimous);
        medical.priority = Priority::P1;
        medical.sources = vec![source("WHO", "medical", Credibility::High)];
        assert_eq!(
            g.requires_expert_review(&medical, "vaccine microchips").1,
            Some(ReviewReason::MedicalInsufficientSources)
        );

        medical.sources.push(source("CDC", "government", Credibility::High));
        assert_eq!(g.requires_expert_review(&medical, "vaccine microchips"), (false, None));
    }

    #[test]
    fn test_review_reason_messages() {
        assert_eq!(ReviewReason::LowConfidence.to_string(), "Low confidence score");
        assert_eq!(
            ReviewReason::ImminentHarm.to_string(),
            "P0 priority claim - potential imminent harm"
        );
    }

    #[test]
    fn test_evaluate_emergency_summary() {
        let g = guardrails();
        let mut r = result("evacuation ordered for the valley", 92.0, ConsensusType::Unanimous);
        r.status = VerificationStatus::True;
        let report = g.evaluate(&r);
        assert_eq!(report.gate, GateDecision::Publish);
        assert_eq!(report.urgency, Urgency::Emergency);
        assert!(report.requires_review());
        assert_eq!(
            report.review_summary().as_deref(),
            Some("Emergency keywords - highest urgency review")
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GuardrailsConfig { max_leaning_share: 0.0, ..GuardrailsConfig::default() };
        assert!(matches!(Guardrails::new(config), Err(GuardrailsError::Config(_))));
    }

    proptest! {
        #[test]
        fn prop_block_iff_below_low(confidence in 0.0f64..=100.0) {
            let g = guardrails();
            let blocked = g.check_confidence(confidence, VerificationStatus::True) == GateDecision::Block;
            prop_assert_eq!(blocked, confidence < 60.0);
        }
    }
}
