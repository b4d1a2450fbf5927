//! Ingestion and coordination records

use factline_domain::{BurstPoster, Post, TextCluster, User};
use serde::{Deserialize, Serialize};

/// One observed post with its author, and the post it reshared if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Author
    pub user: User,
    /// The post; `created_at` doubles as the `POSTED` timestamp
    pub post: Post,
    /// Original post this one reshared
    #[serde(default)]
    pub shared_from: Option<String>,
}

/// Coordinated-behaviour findings (advisory)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoordinationReport {
    /// Users posting in bursts inside the lookback
    pub burst_posters: Vec<BurstPoster>,
    /// Groups of users posting identical text
    pub clusters: Vec<TextCluster>,
    /// Sections that degraded
    #[serde(default)]
    pub diagnostics: Vec<String>,
    /// Unix seconds the analysis was anchored on
    pub generated_at: u64,
}
