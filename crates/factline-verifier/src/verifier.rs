//! Verification orchestration

use crate::config::VerifierConfig;
use crate::consensus::{assess, Assessment};
use crate::error::VerifierError;
use crate::prompt::{summary_explanation, ExplanationPrompt};
use crate::retriever::EvidenceRetriever;
use crate::stance::StanceClassifier;
use crate::types::{NewSource, Stance};
use factline_domain::traits::{CacheStore, EmbeddingService, RetrievalStore, TextGenerator};
use factline_domain::{now_secs, Claim, EvidenceCandidate, VerificationResult};
use factline_guardrails::{GateDecision, Guardrails};
use factline_llm::clean_response;
use factline_store::call_blocking;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Verifies claims against the evidence corpus
///
/// A run embeds the claim, retrieves evidence, labels each source's stance,
/// scores the consensus, writes an explanation and applies the guardrails.
/// Finished verdicts are cached by claim fingerprint when a cache is
/// attached and the run was not degraded.
pub struct Verifier {
    retriever: EvidenceRetriever,
    classifier: StanceClassifier,
    generator: Arc<dyn TextGenerator>,
    cache: Option<Arc<dyn CacheStore>>,
    guardrails: Arc<Guardrails>,
    config: VerifierConfig,
}

impl Verifier {
    /// Create a verifier from its collaborators
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        corpus: Arc<dyn RetrievalStore>,
        generator: Arc<dyn TextGenerator>,
        guardrails: Arc<Guardrails>,
        config: VerifierConfig,
    ) -> Result<Self, VerifierError> {
        config.validate().map_err(VerifierError::Config)?;

        Ok(Self {
            retriever: EvidenceRetriever::new(
                embedder,
                corpus,
                config.embedding_timeout(),
                config.retrieval_timeout(),
            ),
            classifier: StanceClassifier::new(
                Arc::clone(&generator),
                config.stance_params(),
                config.stance_timeout(),
            ),
            generator,
            cache: None,
            guardrails,
            config,
        })
    }

    /// Attach a result cache
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// The evidence retriever
    pub fn retriever(&self) -> &EvidenceRetriever {
        &self.retriever
    }

    /// Add a document to the evidence corpus
    pub async fn add_source(&self, source: NewSource) -> Result<String, VerifierError> {
        self.retriever.add_source(source).await
    }

    async fn cached(&self, key: &str) -> Result<Option<VerificationResult>, String> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let cache = Arc::clone(cache);
        let key = key.to_string();
        let raw = call_blocking(self.config.cache_timeout(), move || cache.get(&key))
            .await
            .map_err(|e| format!("cache read failed: {}", e))?;

        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("ignoring corrupt cache entry: {}", e);
                None
            }
        }))
    }

    async fn store(&self, key: &str, result: &VerificationResult) -> Result<(), String> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        let json = serde_json::to_string(result).map_err(|e| format!("cache encode failed: {}", e))?;
        let cache = Arc::clone(cache);
        let key = key.to_string();
        let ttl = self.config.cache_ttl();
        call_blocking(self.config.cache_timeout(), move || cache.set(&key, &json, Some(ttl)))
            .await
            .map_err(|e| format!("cache write failed: {}", e))
    }

    async fn explain(
        &self,
        claim: &str,
        sources: &[EvidenceCandidate],
        assessment: &Assessment,
    ) -> Result<String, VerifierError> {
        if !self.config.generate_explanations {
            return Ok(summary_explanation(assessment));
        }

        let prompt = ExplanationPrompt::new(claim, sources, assessment)
            .max_sources(self.config.explanation_sources)
            .excerpt_chars(self.config.explanation_excerpt_chars)
            .build();
        let generator = Arc::clone(&self.generator);
        let params = self.config.explanation_params();

        let raw = call_blocking(self.config.explanation_timeout(), move || {
            generator.generate(&prompt, &params)
        })
        .await
        .map_err(|e| VerifierError::ProviderFailure(format!("explanation generation failed: {}", e)))?;

        Ok(clean_response(&raw))
    }

    /// Verify a claim
    ///
    /// Missing evidence yields an `unverified` result with confidence 0 and
    /// makes no generation calls. A claim that cannot be embedded is treated
    /// as having no evidence, with a diagnostic, and is never cached. Failure
    /// of every stance call, or explanation failure, is a
    /// [`VerifierError::ProviderFailure`]. Cache trouble only adds a diagnostic.
    pub async fn verify(&self, claim: &Claim) -> Result<VerificationResult, VerifierError> {
        let text = claim.text.trim();
        if text.is_empty() {
            return Err(VerifierError::EmptyClaim);
        }

        let key = VerificationResult::cache_key(&claim.fingerprint());
        let mut diagnostics = Vec::new();

        match self.cached(&key).await {
            Ok(Some(result)) => {
                info!("cache hit for claim {}", claim.claim_id);
                return Ok(result);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("{}", e);
                diagnostics.push(e);
            }
        }

        info!("verifying claim {} ({})", claim.claim_id, claim.priority);

        let retrieval = self.retriever.retrieve(text, self.config.top_k).await;
        if let Some(failure) = retrieval.embedding_failure {
            warn!("claim {} could not be embedded: {}", claim.claim_id, failure);
            diagnostics.push(format!("claim embedding failed: {}", failure));
        }
        diagnostics.extend(retrieval.diagnostics);

        let mut result = if retrieval.candidates.is_empty() {
            info!("no evidence for claim {}", claim.claim_id);
            VerificationResult::no_evidence(claim, now_secs())
        } else {
            let mut sources = retrieval.candidates;
            let mut failures = 0;
            for source in sources.iter_mut() {
                let outcome = self.classifier.classify(text, &source.excerpt).await;
                source.supports = outcome.stance == Stance::Supports;
                if let Some(e) = outcome.failure {
                    failures += 1;
                    diagnostics.push(format!(
                        "stance classification failed for {}: {}",
                        source.source_id, e
                    ));
                }
            }
            if failures == sources.len() {
                return Err(VerifierError::ProviderFailure(format!(
                    "stance classification failed for all {} sources",
                    failures
                )));
            }

            let assessment = assess(&sources);
            debug!(
                "claim {}: ratio {:.2}, {} ({:.1})",
                claim.claim_id, assessment.ratio, assessment.consensus_type, assessment.confidence
            );

            let explanation = self.explain(text, &sources, &assessment).await?;

            VerificationResult {
                claim_id: claim.claim_id,
                claim_text: claim.text.clone(),
                priority: claim.priority,
                status: assessment.status,
                confidence: assessment.confidence,
                sources,
                supporting_count: assessment.supporting,
                contradicting_count: assessment.contradicting,
                consensus_type: assessment.consensus_type,
                explanation: self.guardrails.privacy().sanitize(&explanation),
                expert_review_required: false,
                review_reason: None,
                diagnostics: Vec::new(),
                verified_at: now_secs(),
            }
        };

        let degraded = !diagnostics.is_empty();

        let policy = self.guardrails.evaluate(&result);
        result.expert_review_required = policy.requires_review();
        result.review_reason = policy.review_summary();
        if policy.gate == GateDecision::Flag {
            if let Some(reason) = policy.gate.reason() {
                diagnostics.push(reason.to_string());
            }
        }
        diagnostics.extend(policy.audit.warnings);
        result.diagnostics = diagnostics;

        info!(
            "claim {} verified as {} ({:.1}% confidence, review: {})",
            result.claim_id, result.status, result.confidence, result.expert_review_required
        );

        if !degraded && !result.sources.is_empty() {
            if let Err(e) = self.store(&key, &result).await {
                warn!("{}", e);
                result.diagnostics.push(e);
            }
        }

        Ok(result)
    }
}
