//! End-to-end tests for the Verifier

#[cfg(test)]
mod tests {
    use crate::{NewSource, Verifier, VerifierConfig, VerifierError};
    use factline_domain::traits::{CacheStore, Counter, EmbeddingService, ServiceError};
    use factline_domain::{
        Claim, ClaimCategory, ConsensusType, Credibility, VerificationResult, VerificationStatus,
    };
    use factline_guardrails::{Guardrails, GuardrailsConfig};
    use factline_llm::MockProvider;
    use factline_store::{CorpusIndex, ManualClock, MemoryCache, MockEmbeddingModel};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const DIM: usize = 64;
    const EXPLANATION: &str = "We understand this is confusing. Officials say otherwise. Check trusted sources.";

    fn scripted_llm() -> MockProvider {
        let mut llm = MockProvider::new("CONTRADICTS");
        llm.add_response_containing("Generate a clear, 3-sentence explanation", EXPLANATION);
        llm
    }

    fn verifier(llm: &MockProvider, corpus: Arc<CorpusIndex>) -> Verifier {
        Verifier::new(
            Arc::new(MockEmbeddingModel::new(DIM)),
            corpus,
            Arc::new(llm.clone()),
            Arc::new(Guardrails::new(GuardrailsConfig::default()).unwrap()),
            VerifierConfig::default(),
        )
        .unwrap()
    }

    fn source(title: &str, content: &str, source_type: &str) -> NewSource {
        NewSource {
            title: title.to_string(),
            content: content.to_string(),
            url: Some(format!("https://example.org/{}", title.to_lowercase())),
            source_type: source_type.to_string(),
            credibility: Credibility::High,
        }
    }

    async fn seeded(verifier: &Verifier) {
        for (title, content, kind) in [
            ("Waterworks", "The city water supply was tested and is safe to drink.", "government"),
            ("Health Board", "Tap water in the city meets every safety standard.", "medical"),
            ("Fact Desk", "Claims that the water supply is unsafe are false.", "fact_check"),
        ] {
            assert_ok!(verifier.add_source(source(title, content, kind)).await);
        }
    }

    fn claim() -> Claim {
        Claim::new("The city water supply is unsafe to drink", ClaimCategory::Other)
    }

    #[tokio::test]
    async fn test_no_evidence_makes_no_generation_calls() {
        let llm = scripted_llm();
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.status, VerificationStatus::Unverified);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.consensus_type, ConsensusType::None);
        assert!(result.sources.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_supporting_is_true() {
        let mut llm = scripted_llm();
        llm.add_response_containing("SUPPORTS or CONTRADICTS", "SUPPORTS");
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.status, VerificationStatus::True);
        assert_eq!(result.consensus_type, ConsensusType::Unanimous);
        assert_eq!(result.supporting_count, 3);
        assert_eq!(result.contradicting_count, 0);
        assert!(result.confidence > 0.0 && result.confidence <= 100.0);
        assert_eq!(result.explanation, EXPLANATION);
        // three stance calls and one explanation
        assert_eq!(llm.call_count(), 4);
    }

    #[tokio::test]
    async fn test_all_contradicting_is_false() {
        let llm = scripted_llm();
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.status, VerificationStatus::False);
        assert_eq!(result.consensus_type, ConsensusType::Unanimous);
        assert_eq!(result.contradicting_count, 3);
        assert!(result.sources.iter().all(|s| !s.supports));
    }

    #[tokio::test]
    async fn test_even_split_is_misleading() {
        let mut llm = scripted_llm();
        llm.add_response_containing("Source: Boiling", "SUPPORTS");
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        assert_ok!(verifier.add_source(source("Utility", "Boiling the water is advised for now.", "government")).await);
        assert_ok!(verifier.add_source(source("Clinic", "The water is safe without boiling.", "medical")).await);

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.status, VerificationStatus::Misleading);
        assert_eq!(result.consensus_type, ConsensusType::Split);
        assert_eq!((result.supporting_count, result.contradicting_count), (1, 1));
        assert!(result.expert_review_required);
        assert!(result.review_reason.is_some());
    }

    #[tokio::test]
    async fn test_cached_until_ttl_expires() {
        let llm = scripted_llm();
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()))
            .with_cache(cache.clone());
        seeded(&verifier).await;

        let first = assert_ok!(verifier.verify(&claim()).await);
        let calls = llm.call_count();
        let key = VerificationResult::cache_key(&claim().fingerprint());
        assert!(cache.get(&key).unwrap().is_some());

        let second = assert_ok!(verifier.verify(&claim()).await);
        assert_eq!(first, second);
        assert_eq!(llm.call_count(), calls);

        clock.advance(Duration::from_secs(3_600));
        assert_ok!(verifier.verify(&claim()).await);
        assert_eq!(llm.call_count(), calls * 2);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_ignored() {
        let llm = scripted_llm();
        let cache = Arc::new(MemoryCache::new());
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()))
            .with_cache(cache.clone());
        seeded(&verifier).await;

        let key = VerificationResult::cache_key(&claim().fingerprint());
        cache.set(&key, "{not json", None).unwrap();

        let result = assert_ok!(verifier.verify(&claim()).await);
        assert_eq!(result.status, VerificationStatus::False);
        assert!(llm.call_count() > 0);
    }

    struct DownEmbedder;

    impl EmbeddingService for DownEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
            Err(ServiceError::Unavailable("embedding service offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_yields_no_evidence() {
        let llm = scripted_llm();
        let cache = Arc::new(MemoryCache::new());
        let verifier = Verifier::new(
            Arc::new(DownEmbedder),
            Arc::new(CorpusIndex::in_memory(DIM).unwrap()),
            Arc::new(llm.clone()),
            Arc::new(Guardrails::new(GuardrailsConfig::default()).unwrap()),
            VerifierConfig::default(),
        )
        .unwrap()
        .with_cache(cache.clone());

        let result = assert_ok!(verifier.verify(&claim()).await);
        assert_eq!(result.status, VerificationStatus::Unverified);
        assert_eq!(result.confidence, 0.0);
        assert!(result.sources.is_empty());
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.starts_with("claim embedding failed")));
        assert_eq!(llm.call_count(), 0);

        let key = VerificationResult::cache_key(&claim().fingerprint());
        assert_eq!(cache.get(&key).unwrap(), None);
    }

    #[tokio::test]
    async fn test_all_stance_calls_failing_is_provider_failure() {
        let llm = MockProvider::failing("offline");
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        seeded(&verifier).await;

        let err = assert_err!(verifier.verify(&claim()).await);
        assert!(matches!(err, VerifierError::ProviderFailure(_)));
    }

    #[tokio::test]
    async fn test_one_stance_failure_degrades_and_skips_cache() {
        let mut llm = scripted_llm();
        llm.add_error_containing("Source: Tap water");
        let cache = Arc::new(MemoryCache::new());
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()))
            .with_cache(cache.clone());
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.contradicting_count, 3);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.starts_with("stance classification failed")));
        let key = VerificationResult::cache_key(&claim().fingerprint());
        assert!(cache.get(&key).unwrap().is_none());
    }

    struct DownCache;

    impl CacheStore for DownCache {
        fn get(&self, _: &str) -> Result<Option<String>, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn set(&self, _: &str, _: &str, _: Option<Duration>) -> Result<(), ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn delete(&self, _: &str) -> Result<bool, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn incr_with_expiry(&self, _: &str, _: Duration) -> Result<Counter, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn counter(&self, _: &str) -> Result<Option<Counter>, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn keys_with_prefix(&self, _: &str) -> Result<Vec<String>, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn push(&self, _: &str, _: &str) -> Result<usize, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn pop(&self, _: &str) -> Result<Option<String>, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
        fn publish(&self, _: &str, _: &str) -> Result<usize, ServiceError> {
            Err(ServiceError::Unavailable("cache offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cache_outage_verifies_uncached() {
        let llm = scripted_llm();
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()))
            .with_cache(Arc::new(DownCache));
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert_eq!(result.status, VerificationStatus::False);
        assert!(result.diagnostics.iter().any(|d| d.starts_with("cache read failed")));
    }

    #[tokio::test]
    async fn test_empty_claim_rejected() {
        let llm = scripted_llm();
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        let err = assert_err!(verifier.verify(&Claim::new("   ", ClaimCategory::Other)).await);
        assert!(matches!(err, VerifierError::EmptyClaim));
    }

    #[tokio::test]
    async fn test_fixed_explanation_when_generation_disabled() {
        let llm = scripted_llm();
        let verifier = Verifier::new(
            Arc::new(MockEmbeddingModel::new(DIM)),
            Arc::new(CorpusIndex::in_memory(DIM).unwrap()),
            Arc::new(llm.clone()),
            Arc::new(Guardrails::new(GuardrailsConfig::default()).unwrap()),
            VerifierConfig {
                generate_explanations: false,
                ..VerifierConfig::default()
            },
        )
        .unwrap();
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert!(result.explanation.starts_with("We understand this is confusing."));
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_emergency_language_routes_to_review() {
        let llm = scripted_llm();
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        seeded(&verifier).await;

        let claim = Claim::new(
            "Emergency: the city water supply is unsafe to drink",
            ClaimCategory::SafetySecurity,
        );
        let result = assert_ok!(verifier.verify(&claim).await);

        assert!(result.expert_review_required);
        assert_eq!(
            result.review_reason.as_deref(),
            Some("Emergency keywords - highest urgency review")
        );
    }

    #[tokio::test]
    async fn test_explanation_is_sanitized() {
        let mut llm = MockProvider::new("CONTRADICTS");
        llm.add_response_containing(
            "Generate a clear, 3-sentence explanation",
            "<think>draft</think>We understand this is confusing. Email help@city.gov for details. Stay safe.",
        );
        let verifier = verifier(&llm, Arc::new(CorpusIndex::in_memory(DIM).unwrap()));
        seeded(&verifier).await;

        let result = assert_ok!(verifier.verify(&claim()).await);

        assert!(!result.explanation.contains("<think>"));
        assert!(result.explanation.contains("[EMAIL REDACTED]"));
    }
}
