//! Factline Guardrails
//!
//! Policy checks applied to every verdict before it leaves the system.
//!
//! The policy layer provides:
//! - Confidence gate (publish, flag or block)
//! - Precautionary flagging for sensitive and emergency topics
//! - Source-bias and source-diversity audit
//! - Expert-review routing with the first matching reason
//! - PII detection and output sanitizing
//!
//! # Examples
//!
//! ```
//! use factline_guardrails::{GateDecision, Guardrails, GuardrailsConfig};
//! use factline_domain::VerificationStatus;
//!
//! let guardrails = Guardrails::new(GuardrailsConfig::default()).unwrap();
//! assert_eq!(
//!     guardrails.check_confidence(45.0, VerificationStatus::True),
//!     GateDecision::Block
//! );
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod policy;
mod privacy;

pub use config::GuardrailsConfig;
pub use error::GuardrailsError;
pub use policy::{
    BiasAudit, GateDecision, Guardrails, PolicyReport, PoliticalBalance, ReviewReason, Urgency,
};
pub use privacy::{PiiKind, PrivacyScanner};
