//! Evidence retriever

use crate::error::VerifierError;
use crate::types::{NewSource, Retrieval};
use factline_domain::traits::{EmbeddingService, RetrievalStore, RetrievedDocument};
use factline_domain::{now_secs, Credibility, EvidenceCandidate};
use factline_store::call_blocking;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Finds corpus documents near a claim and adds new ones
pub struct EvidenceRetriever {
    embedder: Arc<dyn EmbeddingService>,
    corpus: Arc<dyn RetrievalStore>,
    embedding_timeout: Duration,
    retrieval_timeout: Duration,
}

fn candidate_from(doc: RetrievedDocument) -> EvidenceCandidate {
    let meta = |key: &str| doc.metadata.get(key).cloned();
    EvidenceCandidate {
        source_id: doc.id.clone(),
        title: meta("title").unwrap_or_else(|| "Unknown".to_string()),
        url: meta("url").filter(|u| !u.is_empty()),
        source_type: meta("source_type").unwrap_or_else(|| "unknown".to_string()),
        credibility: meta("credibility")
            .map(|c| Credibility::parse(&c))
            .unwrap_or_default(),
        relevance: EvidenceCandidate::relevance_from_distance(f64::from(doc.distance)),
        excerpt: doc.document,
        supports: false,
    }
}

impl EvidenceRetriever {
    /// Create a retriever with per-call deadlines
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        corpus: Arc<dyn RetrievalStore>,
        embedding_timeout: Duration,
        retrieval_timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            corpus,
            embedding_timeout,
            retrieval_timeout,
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, factline_domain::traits::ServiceError> {
        let embedder = Arc::clone(&self.embedder);
        let text = text.to_string();
        call_blocking(self.embedding_timeout, move || embedder.embed(&text)).await
    }

    /// Up to `top_k` candidates for the claim, closest first
    ///
    /// Never fails. An embedding failure is reported in
    /// [`Retrieval::embedding_failure`]; a corpus failure degrades to no
    /// evidence with a diagnostic.
    pub async fn retrieve(&self, claim_text: &str, top_k: usize) -> Retrieval {
        let embedding = match self.embed(claim_text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("claim embedding failed: {}", e);
                return Retrieval {
                    candidates: Vec::new(),
                    embedding_failure: Some(e),
                    diagnostics: Vec::new(),
                };
            }
        };

        let corpus = Arc::clone(&self.corpus);
        let hits = call_blocking(self.retrieval_timeout, move || corpus.query(&embedding, top_k)).await;

        match hits {
            Ok(docs) => {
                let candidates: Vec<_> = docs.into_iter().take(top_k).map(candidate_from).collect();
                info!("retrieved {} evidence candidates", candidates.len());
                Retrieval {
                    candidates,
                    ..Retrieval::default()
                }
            }
            Err(e) => {
                warn!("corpus query failed: {}", e);
                Retrieval {
                    diagnostics: vec![format!("evidence retrieval failed: {}", e)],
                    ..Retrieval::default()
                }
            }
        }
    }

    /// Embed and store a source document; returns its id
    ///
    /// The id is `{source_type}_{title}_{unix_seconds}`, so adding the same
    /// title twice in one second replaces the earlier document.
    pub async fn add_source(&self, source: NewSource) -> Result<String, VerifierError> {
        let added_at = now_secs();
        let id = format!("{}_{}_{}", source.source_type, source.title, added_at);

        let embedding = self.embed(&source.content).await.map_err(|e| {
            error!("failed to embed source {}: {}", source.title, e);
            VerifierError::ProviderFailure(e.to_string())
        })?;

        let mut metadata = HashMap::new();
        metadata.insert("title".to_string(), source.title.clone());
        metadata.insert("url".to_string(), source.url.clone().unwrap_or_default());
        metadata.insert("source_type".to_string(), source.source_type.clone());
        metadata.insert("credibility".to_string(), source.credibility.as_str().to_string());
        metadata.insert("added_at".to_string(), added_at.to_string());

        let corpus = Arc::clone(&self.corpus);
        let doc_id = id.clone();
        let content = source.content;
        call_blocking(self.retrieval_timeout, move || {
            corpus.add(&embedding, &content, metadata, &doc_id)
        })
        .await
        .map_err(|e| {
            error!("failed to store source {}: {}", source.title, e);
            VerifierError::Corpus(e.to_string())
        })?;

        info!("added source: {}", source.title);
        Ok(id)
    }
}
