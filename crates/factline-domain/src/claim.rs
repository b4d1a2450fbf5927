//! Claim module - the unit of work for verification and tracing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Unique identifier for a claim based on UUIDv7
///
/// UUIDv7 keeps identifiers sortable by creation time and needs no
/// coordination between ingest workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ClaimId(u128);

impl ClaimId {
    /// Generate a new UUIDv7-based ClaimId
    ///
    /// # Examples
    ///
    /// ```
    /// use factline_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ClaimId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ClaimId from its hyphenated string form
    ///
    /// # Examples
    ///
    /// ```
    /// use factline_domain::ClaimId;
    ///
    /// let id = ClaimId::new();
    /// let parsed = ClaimId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid claim id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

impl From<ClaimId> for String {
    fn from(id: ClaimId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ClaimId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_string(&value)
    }
}

/// Topic bucket a claim belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimCategory {
    /// Health, disease, treatment
    HealthMedical,
    /// Elections, governments, conflict
    PoliticalGeopolitical,
    /// Weather, climate, natural disasters
    EnvironmentalClimate,
    /// Markets, prices, shortages
    Economic,
    /// Physical safety, crime, attacks
    SafetySecurity,
    /// Anything else
    #[default]
    Other,
}

impl ClaimCategory {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimCategory::HealthMedical => "health_medical",
            ClaimCategory::PoliticalGeopolitical => "political_geopolitical",
            ClaimCategory::EnvironmentalClimate => "environmental_climate",
            ClaimCategory::Economic => "economic",
            ClaimCategory::SafetySecurity => "safety_security",
            ClaimCategory::Other => "other",
        }
    }

    /// Parse a category from its string form (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "health_medical" | "health" | "medical" => Some(ClaimCategory::HealthMedical),
            "political_geopolitical" | "political" => Some(ClaimCategory::PoliticalGeopolitical),
            "environmental_climate" | "environmental" | "climate" => {
                Some(ClaimCategory::EnvironmentalClimate)
            }
            "economic" => Some(ClaimCategory::Economic),
            "safety_security" | "safety" | "security" => Some(ClaimCategory::SafetySecurity),
            "other" => Some(ClaimCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ClaimCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling priority of a claim
///
/// Ordered so that `P0 < P1 < P2 < P3`; lower is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Imminent harm (evacuations, contamination, lockdowns)
    P0,
    /// Medical misinformation
    P1,
    /// Claims attributed to authorities
    P2,
    /// Everything else
    P3,
}

impl Priority {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword policy that assigns a [`Priority`] to claim text
///
/// Rules are evaluated P0, P1, P2 in that order against the lower-cased text
/// and the first rule with a matching term wins. No match yields P3.
///
/// # Examples
///
/// ```
/// use factline_domain::{Priority, PriorityPolicy};
///
/// let policy = PriorityPolicy::default();
/// assert_eq!(policy.classify("Evacuation ordered for the vaccine plant"), Priority::P0);
/// assert_eq!(policy.classify("New vaccine causes outbreak"), Priority::P1);
/// assert_eq!(policy.classify("It rained on Tuesday"), Priority::P3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityPolicy {
    /// Imminent-harm terms
    pub imminent_harm: Vec<String>,
    /// Medical terms
    pub medical: Vec<String>,
    /// Authority-attribution phrases
    pub authority: Vec<String>,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        let owned = |terms: &[&str]| -> Vec<String> { terms.iter().map(|t| t.to_string()).collect() };
        Self {
            imminent_harm: owned(&[
                "evacuation",
                "poisoned",
                "contaminated",
                "imminent",
                "shelter in place",
                "lockdown",
                "immediate danger",
            ]),
            medical: owned(&[
                "vaccine",
                "cure",
                "treatment",
                "outbreak",
                "pandemic",
                "virus",
                "disease",
                "medication",
            ]),
            authority: owned(&[
                "government says",
                "officials announce",
                "cdc reports",
                "who confirms",
                "president declares",
            ]),
        }
    }
}

impl PriorityPolicy {
    /// Assign a priority to the given text
    pub fn classify(&self, text: &str) -> Priority {
        let lower = text.to_lowercase();
        let hit = |terms: &[String]| terms.iter().any(|t| lower.contains(t.as_str()));

        if hit(&self.imminent_harm) {
            Priority::P0
        } else if hit(&self.medical) {
            Priority::P1
        } else if hit(&self.authority) {
            Priority::P2
        } else {
            Priority::P3
        }
    }
}

/// Stable key derived from normalized claim text
///
/// Two claims that differ only in case or whitespace share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed fingerprint (e.g. parsed back from a cache key)
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a claim text
///
/// The text is trimmed, lower-cased and its whitespace runs collapsed to a
/// single space before hashing with SHA-256.
///
/// # Examples
///
/// ```
/// use factline_domain::fingerprint;
///
/// assert_eq!(fingerprint("Water is  Poisoned"), fingerprint(" water is poisoned\n"));
/// assert_ne!(fingerprint("water is poisoned"), fingerprint("water is safe"));
/// ```
pub fn fingerprint(text: &str) -> Fingerprint {
    let normalized = text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    let digest = Sha256::digest(normalized.as_bytes());
    Fingerprint(hex::encode(digest))
}

/// A claim extracted from circulating content
///
/// Claims are immutable once created. Priority is assigned at construction
/// from a [`PriorityPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub claim_id: ClaimId,

    /// The claim as stated
    pub text: String,

    /// Topic bucket
    pub category: ClaimCategory,

    /// Handling priority
    pub priority: Priority,

    /// Salient keywords
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Named entities mentioned in the claim
    #[serde(default)]
    pub entities: Vec<String>,
}

impl Claim {
    /// Create a claim using the default priority policy
    pub fn new(text: impl Into<String>, category: ClaimCategory) -> Self {
        Self::with_policy(text, category, &PriorityPolicy::default())
    }

    /// Create a claim whose priority is assigned by the given policy
    pub fn with_policy(
        text: impl Into<String>,
        category: ClaimCategory,
        policy: &PriorityPolicy,
    ) -> Self {
        let text = text.into();
        let priority = policy.classify(&text);
        Self {
            claim_id: ClaimId::new(),
            text,
            category,
            priority,
            keywords: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Attach keywords
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Attach named entities
    pub fn with_entities(mut self, entities: Vec<String>) -> Self {
        self.entities = entities;
        self
    }

    /// Fingerprint of this claim's text
    pub fn fingerprint(&self) -> Fingerprint {
        fingerprint(&self.text)
    }
}
