//! Factline Sentinel
//!
//! Watches the stream of claim mentions and decides which claims get a full
//! verification run.
//!
//! # Overview
//!
//! The Sentinel is responsible for:
//! - **Velocity tracking**: windowed mention counters per claim fingerprint
//! - **Escalation**: queueing claims that start trending, or that carry
//!   imminent-harm or emergency language on first sighting
//! - **Propagation tracing**: tracing every escalated claim back to patient zero
//! - **Deferred verification**: a background worker draining the FIFO queue
//!
//! # Escalation Rules
//!
//! | Reason | Fires when |
//! |--------|------------|
//! | **Trending** | the window's count reaches `trending_threshold + 1` |
//! | **ImminentHarm** | first mention in the window of a P0 claim |
//! | **Emergency** | first mention in the window of a claim with emergency language |
//!
//! An unknown count (cache down) is treated as a first mention.
//!
//! # Usage
//!
//! ```no_run
//! use factline_domain::{Claim, ClaimCategory};
//! use factline_guardrails::{Guardrails, GuardrailsConfig};
//! use factline_sentinel::{Mention, Sentinel, SentinelConfig};
//! use factline_store::MemoryCache;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = Arc::new(MemoryCache::new());
//! let guardrails = Arc::new(Guardrails::new(GuardrailsConfig::default())?);
//! let mut sentinel = Sentinel::new(cache, guardrails, SentinelConfig::default())?;
//!
//! let claim = Claim::new("Evacuation ordered for the east bank", ClaimCategory::SafetySecurity);
//! let observation = sentinel.observe(Mention { claim, post: None }).await;
//! println!("escalated: {:?}", observation.escalation);
//! println!("\n{}", sentinel.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [sentinel]
//! velocity_window_secs = 3600
//! trending_threshold = 500
//! cache_timeout_ms = 500
//! verification_queue = "verification"
//! dead_letter_queue = "verification:dead"
//! alert_channel = "alerts"
//! verdict_channel = "verdicts"
//! trace_on_escalation = true
//! poll_interval_secs = 5
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod queue;
mod sentinel;
mod velocity;
mod worker;

pub use config::SentinelConfig;
pub use error::SentinelError;
pub use metrics::SentinelMetrics;
pub use queue::{VerificationQueue, VerificationRequest};
pub use sentinel::{Alert, EscalationReason, Mention, Observation, Sentinel};
pub use velocity::{VelocitySnapshot, VelocityTracker};
pub use worker::VerificationWorker;
