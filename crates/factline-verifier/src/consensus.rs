//! Consensus & confidence engine
//!
//! Pure functions from stance-labelled evidence to a verdict. Consensus bands
//! are symmetric around a 0.5 ratio; status bands are not, and ratios in
//! (0.2, 0.3) or (0.7, 0.8) resolve to `unverified`.

use factline_domain::{ConsensusType, EvidenceCandidate, VerificationStatus};

/// Consensus band with its base confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Consensus {
    /// Band
    pub consensus_type: ConsensusType,
    /// Base confidence before the credibility boost
    pub base_confidence: f64,
}

/// Consensus band for a supporting ratio
pub fn classify_ratio(ratio: f64) -> Consensus {
    let (consensus_type, base_confidence) = if ratio >= 0.9 || ratio <= 0.1 {
        (ConsensusType::Unanimous, 95.0)
    } else if ratio >= 0.7 || ratio <= 0.3 {
        (ConsensusType::Majority, 70.0)
    } else {
        (ConsensusType::Split, 40.0)
    };
    Consensus { consensus_type, base_confidence }
}

/// Verdict for a supporting ratio
pub fn status_for_ratio(ratio: f64) -> VerificationStatus {
    if ratio >= 0.8 {
        VerificationStatus::True
    } else if ratio <= 0.2 {
        VerificationStatus::False
    } else if (0.3..=0.7).contains(&ratio) {
        VerificationStatus::Misleading
    } else {
        VerificationStatus::Unverified
    }
}

/// `min(100, (base + min(5 * high_credibility, 20)) * avg_relevance)`, clamped to [0, 100]
pub fn confidence(base_confidence: f64, high_credibility: usize, avg_relevance: f64) -> f64 {
    let boost = (5 * high_credibility).min(20) as f64;
    let relevance = if avg_relevance.is_nan() { 0.0 } else { avg_relevance.clamp(0.0, 1.0) };
    ((base_confidence + boost) * relevance).clamp(0.0, 100.0)
}

/// Verdict over a set of labelled sources
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Consensus band
    pub consensus_type: ConsensusType,
    /// Supporting share in [0, 1]; 0 without evidence
    pub ratio: f64,
    /// Verdict
    pub status: VerificationStatus,
    /// Confidence in [0, 100]
    pub confidence: f64,
    /// Supporting sources
    pub supporting: usize,
    /// Contradicting sources
    pub contradicting: usize,
}

/// Assess labelled sources
///
/// No evidence is terminal: consensus `none`, status `unverified`,
/// confidence 0.
///
/// # Examples
///
/// ```
/// use factline_verifier::consensus::assess;
/// use factline_domain::{ConsensusType, VerificationStatus};
///
/// let assessment = assess(&[]);
/// assert_eq!(assessment.consensus_type, ConsensusType::None);
/// assert_eq!(assessment.status, VerificationStatus::Unverified);
/// assert_eq!(assessment.confidence, 0.0);
/// ```
pub fn assess(sources: &[EvidenceCandidate]) -> Assessment {
    if sources.is_empty() {
        return Assessment {
            consensus_type: ConsensusType::None,
            ratio: 0.0,
            status: VerificationStatus::Unverified,
            confidence: 0.0,
            supporting: 0,
            contradicting: 0,
        };
    }

    let total = sources.len();
    let supporting = sources.iter().filter(|s| s.supports).count();
    let ratio = supporting as f64 / total as f64;

    let consensus = classify_ratio(ratio);
    let high_credibility = sources.iter().filter(|s| s.is_high_credibility()).count();
    let avg_relevance = sources.iter().map(|s| s.relevance).sum::<f64>() / total as f64;

    Assessment {
        consensus_type: consensus.consensus_type,
        ratio,
        status: status_for_ratio(ratio),
        confidence: confidence(consensus.base_confidence, high_credibility, avg_relevance),
        supporting,
        contradicting: total - supporting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::Credibility;
    use proptest::prelude::*;

    fn labelled(supports: bool, credibility: Credibility, relevance: f64) -> EvidenceCandidate {
        EvidenceCandidate {
            source_id: "s".to_string(),
            title: "t".to_string(),
            url: None,
            source_type: "medical".to_string(),
            credibility,
            excerpt: String::new(),
            relevance,
            supports,
        }
    }

    #[test]
    fn test_consensus_bands() {
        assert_eq!(classify_ratio(1.0).consensus_type, ConsensusType::Unanimous);
        assert_eq!(classify_ratio(0.1).consensus_type, ConsensusType::Unanimous);
        assert_eq!(classify_ratio(0.7).consensus_type, ConsensusType::Majority);
        assert_eq!(classify_ratio(0.3).consensus_type, ConsensusType::Majority);
        assert_eq!(classify_ratio(0.5), Consensus { consensus_type: ConsensusType::Split, base_confidence: 40.0 });
    }

    #[test]
    fn test_status_gaps_fall_through() {
        assert_eq!(status_for_ratio(0.8), VerificationStatus::True);
        assert_eq!(status_for_ratio(0.75), VerificationStatus::Unverified);
        assert_eq!(status_for_ratio(0.7), VerificationStatus::Misleading);
        assert_eq!(status_for_ratio(0.3), VerificationStatus::Misleading);
        assert_eq!(status_for_ratio(0.25), VerificationStatus::Unverified);
        assert_eq!(status_for_ratio(0.2), VerificationStatus::False);
    }

    #[test]
    fn test_all_supporting_is_true_unanimous() {
        let sources = vec![
            labelled(true, Credibility::High, 0.9),
            labelled(true, Credibility::High, 0.9),
            labelled(true, Credibility::Medium, 0.9),
        ];
        let a = assess(&sources);
        assert_eq!(a.status, VerificationStatus::True);
        assert_eq!(a.consensus_type, ConsensusType::Unanimous);
        // (95 + 10) * 0.9
        assert!((a.confidence - 94.5).abs() < 1e-9);
    }

    #[test]
    fn test_none_supporting_is_false_unanimous() {
        let sources = vec![labelled(false, Credibility::Low, 0.5); 4];
        let a = assess(&sources);
        assert_eq!(a.status, VerificationStatus::False);
        assert_eq!(a.consensus_type, ConsensusType::Unanimous);
        assert_eq!((a.supporting, a.contradicting), (0, 4));
    }

    #[test]
    fn test_half_supporting_is_misleading_split() {
        let sources = vec![
            labelled(true, Credibility::High, 1.0),
            labelled(false, Credibility::High, 1.0),
        ];
        let a = assess(&sources);
        assert_eq!(a.status, VerificationStatus::Misleading);
        assert_eq!(a.consensus_type, ConsensusType::Split);
        assert_eq!(a.confidence, 50.0);
    }

    #[test]
    fn test_boost_is_capped() {
        assert_eq!(confidence(95.0, 10, 1.0), 100.0);
        assert_eq!(confidence(40.0, 10, 0.5), 30.0);
    }

    proptest! {
        #[test]
        fn prop_confidence_bounded(
            labels in proptest::collection::vec(
                (any::<bool>(), 0u8..4, 0.0f64..=1.0),
                1..20
            )
        ) {
            let sources: Vec<_> = labels
                .into_iter()
                .map(|(supports, cred, relevance)| {
                    let credibility = match cred {
                        0 => Credibility::High,
                        1 => Credibility::Medium,
                        2 => Credibility::Low,
                        _ => Credibility::Unknown,
                    };
                    labelled(supports, credibility, relevance)
                })
                .collect();
            let a = assess(&sources);
            prop_assert!((0.0..=100.0).contains(&a.confidence));
            prop_assert!((0.0..=1.0).contains(&a.ratio));
            prop_assert_eq!(a.supporting + a.contradicting, sources.len());
        }

        #[test]
        fn prop_confidence_fn_bounded(
            base in -50.0f64..200.0,
            high in 0usize..50,
            relevance in -1.0f64..2.0,
        ) {
            let c = confidence(base, high, relevance);
            prop_assert!((0.0..=100.0).contains(&c));
        }
    }
}
