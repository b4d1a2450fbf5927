//! Service wiring.
//!
//! Every collaborator is built once from the configuration and handed to the
//! components as an explicit `Arc` handle.

use crate::config::{Config, EmbeddingKind};
use crate::error::Result;
use factline_domain::traits::{EmbeddingService, GraphStore, TextGenerator};
use factline_guardrails::Guardrails;
use factline_llm::{OllamaEmbedder, ProviderConfig};
use factline_propagation::PropagationEngine;
use factline_sentinel::{Sentinel, VerificationWorker};
use factline_store::{CorpusIndex, MemoryCache, MockEmbeddingModel, SqliteGraphStore};
use factline_verifier::Verifier;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

/// Built services for one CLI invocation.
pub struct Runtime {
    /// Loaded configuration
    pub config: Config,
    /// Process-local cache (verdicts, velocity, queue, channels)
    pub cache: Arc<MemoryCache>,
    /// Shared guardrails
    pub guardrails: Arc<Guardrails>,
    /// Verification pipeline
    pub verifier: Arc<Verifier>,
    /// Graph analyses
    pub propagation: Arc<PropagationEngine>,
}

impl Runtime {
    /// Open the on-disk corpus and graph under the configured data directory.
    pub fn open(config: Config) -> Result<Self> {
        let dir = config.data_dir()?;
        fs::create_dir_all(&dir)?;
        let corpus = CorpusIndex::open(dir.join("corpus.db"), config.embedding.dimension)?;
        let graph = SqliteGraphStore::new(dir.join("graph.db"))?;
        info!("opened corpus ({} documents) and graph in {}", corpus.len(), dir.display());
        Self::assemble(config, corpus, graph)
    }

    /// Build everything over in-memory stores.
    pub fn in_memory(config: Config) -> Result<Self> {
        let corpus = CorpusIndex::in_memory(config.embedding.dimension)?;
        let graph = SqliteGraphStore::new(":memory:")?;
        Self::assemble(config, corpus, graph)
    }

    fn assemble(config: Config, corpus: CorpusIndex, graph: SqliteGraphStore) -> Result<Self> {
        let embedder = build_embedder(&config)?;
        let generator = build_generator(&config.providers);
        let guardrails = Arc::new(Guardrails::new(config.guardrails.clone())?);
        let cache = Arc::new(MemoryCache::new());

        let verifier = Verifier::new(
            embedder,
            Arc::new(corpus),
            generator,
            Arc::clone(&guardrails),
            config.verifier.clone(),
        )?
        .with_cache(cache.clone());

        let graph: Arc<dyn GraphStore> = Arc::new(graph);
        let propagation = PropagationEngine::new(graph, config.propagation.clone())?;

        Ok(Self {
            config,
            cache,
            guardrails,
            verifier: Arc::new(verifier),
            propagation: Arc::new(propagation),
        })
    }

    /// Sentinel wired to this runtime's cache and graph.
    pub fn sentinel(&self) -> Result<Sentinel> {
        Ok(Sentinel::new(
            self.cache.clone(),
            Arc::clone(&self.guardrails),
            self.config.sentinel.clone(),
        )?
        .with_propagation(Arc::clone(&self.propagation)))
    }

    /// Worker draining this runtime's verification queue.
    pub fn worker(&self) -> VerificationWorker {
        VerificationWorker::new(Arc::clone(&self.verifier), self.cache.clone(), &self.config.sentinel)
    }
}

fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingService>> {
    let settings = &config.embedding;
    Ok(match settings.kind {
        EmbeddingKind::Mock => Arc::new(MockEmbeddingModel::new(settings.dimension)),
        EmbeddingKind::Ollama => {
            let endpoint = if settings.endpoint.is_empty() {
                factline_llm::ollama::DEFAULT_ENDPOINT
            } else {
                settings.endpoint.as_str()
            };
            Arc::new(OllamaEmbedder::new(endpoint, settings.model.as_str())?)
        }
    })
}

fn build_generator(providers: &[ProviderConfig]) -> Arc<dyn TextGenerator> {
    let chain = ProviderConfig::build_chain(providers);
    if chain.is_empty() {
        warn!("no usable model provider configured; stance classification will fail");
    } else {
        info!("model providers: {}", chain.names().join(" -> "));
    }
    Arc::new(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingSettings;

    pub(crate) fn offline_config() -> Config {
        Config {
            embedding: EmbeddingSettings {
                kind: EmbeddingKind::Mock,
                dimension: 32,
                ..EmbeddingSettings::default()
            },
            providers: vec![ProviderConfig::mock("CONTRADICTS")],
            ..Config::default()
        }
    }

    #[test]
    fn test_open_creates_databases() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config();
        config.storage.data_dir = Some(dir.path().join("data"));

        let runtime = Runtime::open(config).unwrap();
        assert!(dir.path().join("data").join("corpus.db").exists());
        assert!(dir.path().join("data").join("graph.db").exists());
        assert!(runtime.sentinel().is_ok());
    }
}
