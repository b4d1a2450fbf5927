//! Prompts for stance classification and explanations

use crate::consensus::Assessment;
use factline_domain::EvidenceCandidate;

/// Stance prompt: the model must answer with one of two tokens
pub fn stance_prompt(claim: &str, excerpt: &str) -> String {
    format!(
        "Does the following source text support or contradict the claim?\n\n\
         Claim: {}\n\n\
         Source: {}\n\n\
         Respond with only: SUPPORTS or CONTRADICTS",
        claim, excerpt
    )
}

const EXPLANATION_REQUIREMENTS: &str = "Requirements:
- Exactly 3 sentences
- Empathetic, non-condescending tone
- Explain WHY the claim is true/false/misleading
- No jargon, active voice
- Start with \"We understand this is confusing.\"
";

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds the fact-check explanation prompt
pub struct ExplanationPrompt<'a> {
    claim: &'a str,
    sources: &'a [EvidenceCandidate],
    assessment: &'a Assessment,
    max_sources: usize,
    excerpt_chars: usize,
}

impl<'a> ExplanationPrompt<'a> {
    /// Create a builder quoting the top three sources, 200 characters each
    pub fn new(claim: &'a str, sources: &'a [EvidenceCandidate], assessment: &'a Assessment) -> Self {
        Self {
            claim,
            sources,
            assessment,
            max_sources: 3,
            excerpt_chars: 200,
        }
    }

    /// Limit the number of quoted sources
    pub fn max_sources(mut self, n: usize) -> Self {
        self.max_sources = n;
        self
    }

    /// Limit each quoted excerpt
    pub fn excerpt_chars(mut self, n: usize) -> Self {
        self.excerpt_chars = n;
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str("Generate a clear, 3-sentence explanation for this fact-check.\n\n");
        prompt.push_str(&format!("Claim: {}\n\n", self.claim));

        prompt.push_str("Sources:\n");
        for source in self.sources.iter().take(self.max_sources) {
            prompt.push_str(&format!(
                "- {}: {}\n",
                source.title,
                truncate_chars(&source.excerpt, self.excerpt_chars)
            ));
        }
        prompt.push('\n');

        prompt.push_str(&format!(
            "Consensus: {} ({:.0}% supporting)\n\n",
            self.assessment.consensus_type,
            self.assessment.ratio * 100.0
        ));
        prompt.push_str(EXPLANATION_REQUIREMENTS);
        prompt
    }
}

/// Fixed explanation used when model explanations are switched off
pub fn summary_explanation(assessment: &Assessment) -> String {
    format!(
        "We understand this is confusing. {} of {} authoritative sources support this claim, \
         so we rate it {}. Please rely on official guidance while we keep checking.",
        assessment.supporting,
        assessment.supporting + assessment.contradicting,
        assessment.status
    )
}
