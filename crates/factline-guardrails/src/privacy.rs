//! PII detection and output sanitizing

use crate::GuardrailsError;
use regex::Regex;

/// Kind of personal data found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiiKind {
    /// US social security number (`123-45-6789`)
    Ssn,
    /// Sixteen consecutive digits
    CardNumber,
    /// E-mail address
    Email,
}

impl PiiKind {
    /// Short label
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiKind::Ssn => "ssn",
            PiiKind::CardNumber => "card_number",
            PiiKind::Email => "email",
        }
    }
}

/// Compiled PII patterns
pub struct PrivacyScanner {
    ssn: Regex,
    card: Regex,
    email: Regex,
    phone: Regex,
}

impl PrivacyScanner {
    /// Compile the built-in patterns
    pub fn new() -> Result<Self, GuardrailsError> {
        Ok(Self {
            ssn: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b")?,
            card: Regex::new(r"\b\d{16}\b")?,
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
            phone: Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b")?,
        })
    }

    /// Kinds of PII present in `text`, in a fixed order
    pub fn check(&self, text: &str) -> Vec<PiiKind> {
        let mut found = Vec::new();
        if self.ssn.is_match(text) {
            found.push(PiiKind::Ssn);
        }
        if self.card.is_match(text) {
            found.push(PiiKind::CardNumber);
        }
        if self.email.is_match(text) {
            found.push(PiiKind::Email);
        }
        found
    }

    /// Whether `text` is free of detectable PII
    pub fn is_clean(&self, text: &str) -> bool {
        self.check(text).is_empty()
    }

    /// Redact e-mail addresses and phone numbers
    pub fn sanitize(&self, text: &str) -> String {
        let redacted = self.email.replace_all(text, "[EMAIL REDACTED]");
        self.phone
            .replace_all(&redacted, "[PHONE REDACTED]")
            .into_owned()
    }
}
