//! Social graph nodes
//!
//! `User` and `Post` are keyed by `user_id` and `post_id`; the graph store
//! enforces uniqueness. Edges are `POSTED` (user to post, timestamped) and
//! `SHARED_FROM` (reshare to original).

use serde::{Deserialize, Serialize};

/// An account on a social platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique key
    pub user_id: String,
    /// Display handle
    pub username: String,
    /// Follower count at last observation
    pub followers_count: u64,
    /// Platform name
    pub platform: String,
    /// Account creation time (unix seconds), if known
    #[serde(default)]
    pub account_created: Option<u64>,
}

/// A post on a social platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique key
    pub post_id: String,
    /// Full post text
    pub text: String,
    /// Claim text extracted from the post
    pub claim_text: String,
    /// Platform name
    pub platform: String,
    /// Creation time (unix seconds)
    pub created_at: u64,
    /// Likes, replies and similar interactions
    #[serde(default)]
    pub engagement_count: u64,
    /// Estimated audience
    #[serde(default)]
    pub reach: u64,
}

/// A `POSTED` edge joined with the post text
///
/// Used for coordinated-behaviour heuristics, which only need who posted what
/// and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Posting user
    pub user_id: String,
    /// Post key
    pub post_id: String,
    /// Post text
    pub text: String,
    /// Edge timestamp (unix seconds)
    pub posted_at: u64,
}
