//! Propagation report records
//!
//! Reports are derived views over the social graph. They are recomputed on
//! demand and never cached, since sharing continues after a report is built.

use crate::{Post, User};
use serde::{Deserialize, Serialize};

/// Earliest known post carrying a claim, with its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientZero {
    /// The origin post
    pub post: Post,
    /// The user who posted it
    pub user: User,
}

/// One reshare in a propagation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// The reshare
    pub post: Post,
    /// Who posted the reshare; `None` if the graph has no `POSTED` edge for it
    pub user: Option<User>,
    /// Hops from the origin (1 = direct reshare)
    pub depth: usize,
}

/// A high-follower user who reshared near the origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amplifier {
    /// The amplifying user
    pub user: User,
    /// Number of reshares by this user within the amplifier depth
    pub share_count: usize,
    /// Shallowest depth at which the user reshared
    pub min_depth: usize,
}

/// Aggregate spread of an origin post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpreadStats {
    /// Distinct reshares reachable from the origin
    pub total_shares: usize,
    /// Distinct users among those reshares
    pub unique_sharers: usize,
    /// Sum of follower counts over distinct sharers
    pub total_reach: u64,
    /// Largest follower count among sharers
    pub max_amplifier_followers: u64,
}

/// A user posting in bursts (advisory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstPoster {
    /// The user
    pub user_id: String,
    /// Highest number of posts inside any single window
    pub peak_posts: usize,
    /// Start of the busiest window (unix seconds)
    pub window_start: u64,
}

/// Distinct users who posted byte-identical text (advisory)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCluster {
    /// The shared text
    pub text: String,
    /// Distinct posting users, sorted
    pub user_ids: Vec<String>,
    /// Total posts carrying the text
    pub post_count: usize,
}

/// Full propagation view of one origin post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationReport {
    /// Origin post the report is anchored on
    pub origin_post_id: String,
    /// Origin post and author, when the graph knows both
    pub patient_zero: Option<PatientZero>,
    /// Reshares ordered by (depth, created_at, post_id)
    pub tree: Vec<TreeNode>,
    /// Amplifiers ordered by followers descending
    pub amplifiers: Vec<Amplifier>,
    /// Aggregate spread
    pub spread_stats: SpreadStats,
    /// Sections that degraded (graph errors, timeouts)
    #[serde(default)]
    pub diagnostics: Vec<String>,
    /// Unix seconds when the report was built
    pub generated_at: u64,
}

impl PropagationReport {
    /// Whether any section fell back to an empty result
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
