//! Factline Verifier
//!
//! Checks a claim against an evidence corpus and produces a verdict with a
//! confidence score, the stance-labelled sources and a short explanation.
//!
//! # Architecture
//!
//! ```text
//! Claim → Retriever → Stance Classifier → Consensus → Explanation → Guardrails → Cache
//! ```
//!
//! # Key Features
//!
//! - **Evidence Retrieval**: Nearest-neighbour search over an embedded corpus
//! - **Stance Classification**: One constrained generation call per source
//! - **Consensus Scoring**: Ratio bands, credibility boost, relevance weighting
//! - **Policy**: Every verdict passes the guardrails before it is returned
//! - **Caching**: Verdicts are cached by claim fingerprint with a TTL
//!
//! # Example Usage
//!
//! ```no_run
//! use factline_domain::{Claim, ClaimCategory};
//! use factline_guardrails::{Guardrails, GuardrailsConfig};
//! use factline_llm::MockProvider;
//! use factline_store::{CorpusIndex, MemoryCache, MockEmbeddingModel};
//! use factline_verifier::{NewSource, Verifier, VerifierConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier = Verifier::new(
//!     Arc::new(MockEmbeddingModel::new(64)),
//!     Arc::new(CorpusIndex::in_memory(64)?),
//!     Arc::new(MockProvider::new("CONTRADICTS")),
//!     Arc::new(Guardrails::new(GuardrailsConfig::default())?),
//!     VerifierConfig::default(),
//! )?
//! .with_cache(Arc::new(MemoryCache::new()));
//!
//! verifier
//!     .add_source(NewSource {
//!         title: "WHO Fact Sheet".to_string(),
//!         content: "Drinking bleach does not cure any disease.".to_string(),
//!         url: None,
//!         source_type: "medical".to_string(),
//!         credibility: Default::default(),
//!     })
//!     .await?;
//!
//! let claim = Claim::new("Drinking bleach cures the virus", ClaimCategory::HealthMedical);
//! let result = verifier.verify(&claim).await?;
//! println!("{}: {:.0}%", result.status, result.confidence);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod prompt;
mod retriever;
mod stance;
mod types;
mod verifier;

pub mod consensus;

#[cfg(test)]
mod tests;

pub use config::VerifierConfig;
pub use consensus::{assess, Assessment, Consensus};
pub use error::VerifierError;
pub use prompt::{stance_prompt, summary_explanation, ExplanationPrompt};
pub use retriever::EvidenceRetriever;
pub use stance::{parse_stance, StanceClassifier};
pub use types::{NewSource, Retrieval, Stance, StanceOutcome};
pub use verifier::Verifier;
