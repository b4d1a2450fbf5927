//! Intermediate types of a verification run

use factline_domain::traits::ServiceError;
use factline_domain::{Credibility, EvidenceCandidate};
use serde::{Deserialize, Serialize};

/// Stance of one source toward a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stance {
    /// The source supports the claim
    Supports,
    /// Anything else
    Contradicts,
}

/// Classifier output for one source
#[derive(Debug, Clone, PartialEq)]
pub struct StanceOutcome {
    /// Decided stance; `Contradicts` when the call failed
    pub stance: Stance,
    /// Set when the generation call failed or timed out
    pub failure: Option<ServiceError>,
}

/// Output of the evidence retriever
///
/// Retrieval never fails outright. An empty `candidates` list means "no
/// evidence"; `embedding_failure` tells the caller that the claim could not
/// even be embedded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    /// Candidates, closest first, `supports` unset
    pub candidates: Vec<EvidenceCandidate>,
    /// Embedding service error, if any
    pub embedding_failure: Option<ServiceError>,
    /// Degradation notes for the result
    pub diagnostics: Vec<String>,
}

/// A document to add to the evidence corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSource {
    /// Display title
    pub title: String,
    /// Body text; this is what gets embedded
    pub content: String,
    /// Link to the original
    #[serde(default)]
    pub url: Option<String>,
    /// Kind of source (`medical`, `government`, `fact_check`, ...)
    pub source_type: String,
    /// Credibility tier
    #[serde(default)]
    pub credibility: Credibility,
}
