//! Factline Domain Layer
//!
//! This crate contains the core records and collaborator contracts shared by
//! every Factline component. It keeps its dependency set small (identifiers,
//! serialization, hashing) and holds no infrastructure code.
//!
//! ## Key Concepts
//!
//! - **Claim**: An immutable natural-language assertion with a priority assigned
//!   by keyword policy
//! - **Fingerprint**: A stable hash of the normalized claim text, used as the key
//!   for the verification cache and the velocity counters
//! - **Evidence**: Retrieved source excerpts labelled as supporting or contradicting
//! - **Verification Result**: Verdict, consensus type and a bounded confidence score
//! - **Propagation Report**: Patient zero, reshare tree, amplifiers and spread stats
//!   derived from the social graph
//!
//! ## Architecture
//!
//! - Pure data and decision rules only
//! - Collaborator contracts (embedding, generation, retrieval, graph, cache) are
//!   traits in [`traits`]; implementations live in other crates
//! - Every collaborator call returns a [`traits::ServiceError`] on failure so callers
//!   can choose a fallback

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod evidence;
pub mod graph;
pub mod propagation;
pub mod traits;
pub mod verification;

mod time;

// Re-exports for convenience
pub use claim::{fingerprint, Claim, ClaimCategory, ClaimId, Fingerprint, Priority, PriorityPolicy};
pub use evidence::{Credibility, EvidenceCandidate};
pub use graph::{Post, Posting, User};
pub use propagation::{
    Amplifier, BurstPoster, PatientZero, PropagationReport, SpreadStats, TextCluster, TreeNode,
};
pub use time::now_secs;
pub use verification::{ConsensusType, VerificationResult, VerificationStatus};
