//! Factline Propagation
//!
//! Traces how a claim moved through a social graph of users, posts, `POSTED`
//! edges and `SHARED_FROM` edges.
//!
//! # Analyses
//!
//! - **Patient zero**: earliest post carrying the claim, with its author
//! - **Propagation tree**: reshares by depth, breadth-first from the origin
//! - **Amplifiers**: high-follower users resharing near the origin
//! - **Spread statistics**: shares, distinct sharers and follower reach
//! - **Coordinated behaviour**: burst posters and identical-text clusters
//!
//! Coordination findings are advisory signals for a reviewer, not verdicts.
//!
//! # Example Usage
//!
//! ```no_run
//! use factline_propagation::{PropagationConfig, PropagationEngine};
//! use factline_store::SqliteGraphStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let graph = Arc::new(SqliteGraphStore::new("graph.db")?);
//! let engine = PropagationEngine::new(graph, PropagationConfig::default())?;
//!
//! if let Some(report) = engine.trace_claim("tap water is poisoned", 5).await? {
//!     println!("{} reshares, reach {}", report.tree.len(), report.spread_stats.total_reach);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod types;

pub mod analysis;

pub use config::PropagationConfig;
pub use engine::PropagationEngine;
pub use error::PropagationError;
pub use types::{CoordinationReport, PostRecord};
