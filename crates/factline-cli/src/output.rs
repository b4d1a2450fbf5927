//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use factline_domain::{
    Fingerprint, PatientZero, PropagationReport, VerificationResult, VerificationStatus,
};
use factline_propagation::CoordinationReport;
use factline_sentinel::Observation;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    fn table(builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a verdict with its evidence.
    pub fn format_verification(&self, result: &VerificationResult) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(result);
        }

        let mut lines = vec![
            format!("Claim:       {}", result.claim_text),
            format!("Verdict:     {}", self.status(result.status)),
            format!("Confidence:  {:.1}", result.confidence),
            format!(
                "Consensus:   {} ({} supporting, {} contradicting)",
                result.consensus_type, result.supporting_count, result.contradicting_count
            ),
            format!("Priority:    {}", result.priority),
        ];
        if result.expert_review_required {
            let reason = result.review_reason.as_deref().unwrap_or("unspecified");
            lines.push(self.warning(&format!("Expert review required: {}", reason)));
        }
        lines.push(String::new());
        lines.push(result.explanation.clone());

        if !result.sources.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Stance", "Title", "Type", "Credibility", "Relevance"]);
            for source in &result.sources {
                let stance = if source.supports { "supports" } else { "contradicts" };
                builder.push_record([
                    stance.to_string(),
                    truncate(&source.title, 40),
                    source.source_type.clone(),
                    source.credibility.as_str().to_string(),
                    format!("{:.2}", source.relevance),
                ]);
            }
            lines.push(String::new());
            lines.push(Self::table(builder));
        }

        for note in &result.diagnostics {
            lines.push(self.warning(note));
        }
        Ok(lines.join("\n"))
    }

    /// Format the earliest post of a claim.
    pub fn format_patient_zero(&self, found: Option<&PatientZero>) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&found);
        }
        let Some(pz) = found else {
            return Ok(self.colorize("No post carries this claim.", "yellow"));
        };
        Ok([
            format!("Post:      {} ({})", pz.post.post_id, pz.post.platform),
            format!("Posted at: {}", pz.post.created_at),
            format!("User:      {} {} ({} followers)", pz.user.user_id, pz.user.username, pz.user.followers_count),
            format!("Text:      {}", truncate(&pz.post.text, 100)),
        ]
        .join("\n"))
    }

    /// Format a propagation report.
    pub fn format_report(&self, report: &PropagationReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }

        let stats = &report.spread_stats;
        let mut lines = vec![
            format!("Origin post: {}", report.origin_post_id),
            self.format_patient_zero(report.patient_zero.as_ref())?,
            String::new(),
            format!(
                "Spread: {} shares by {} users, reach {}, largest sharer {} followers",
                stats.total_shares, stats.unique_sharers, stats.total_reach, stats.max_amplifier_followers
            ),
        ];

        if !report.tree.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Depth", "Post", "User", "Followers", "Posted at"]);
            for node in &report.tree {
                let (user, followers) = match &node.user {
                    Some(u) => (u.user_id.clone(), u.followers_count.to_string()),
                    None => ("?".to_string(), "-".to_string()),
                };
                builder.push_record([
                    node.depth.to_string(),
                    node.post.post_id.clone(),
                    user,
                    followers,
                    node.post.created_at.to_string(),
                ]);
            }
            lines.push(String::new());
            lines.push(Self::table(builder));
        }

        if !report.amplifiers.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Amplifier", "Followers", "Shares", "Closest depth"]);
            for a in &report.amplifiers {
                builder.push_record([
                    a.user.user_id.clone(),
                    a.user.followers_count.to_string(),
                    a.share_count.to_string(),
                    a.min_depth.to_string(),
                ]);
            }
            lines.push(String::new());
            lines.push(Self::table(builder));
        }

        for note in &report.diagnostics {
            lines.push(self.warning(note));
        }
        Ok(lines.join("\n"))
    }

    /// Format coordinated-behaviour findings.
    pub fn format_coordination(&self, report: &CoordinationReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }
        if report.burst_posters.is_empty() && report.clusters.is_empty() && report.diagnostics.is_empty() {
            return Ok(self.success("No coordinated behaviour found."));
        }

        let mut lines = vec![self.info("Advisory signals only; review before acting.")];
        if !report.burst_posters.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Burst poster", "Peak posts", "Window start"]);
            for b in &report.burst_posters {
                builder.push_record([b.user_id.clone(), b.peak_posts.to_string(), b.window_start.to_string()]);
            }
            lines.push(Self::table(builder));
        }
        if !report.clusters.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Identical text", "Users", "Posts"]);
            for c in &report.clusters {
                builder.push_record([truncate(&c.text, 60), c.user_ids.len().to_string(), c.post_count.to_string()]);
            }
            lines.push(Self::table(builder));
        }
        for note in &report.diagnostics {
            lines.push(self.warning(note));
        }
        Ok(lines.join("\n"))
    }

    /// Format the outcome of an ingest run.
    pub fn format_ingest(
        &self,
        observations: &[Observation],
        verdicts: &[VerificationResult],
        trending: &[(Fingerprint, u64)],
    ) -> Result<String> {
        if self.format == OutputFormat::Json {
            let escalations: Vec<_> = observations
                .iter()
                .filter_map(|o| {
                    o.escalation.map(|reason| {
                        serde_json::json!({
                            "fingerprint": o.velocity.fingerprint,
                            "reason": reason,
                            "velocity": o.velocity.count,
                            "queued": o.queued,
                            "propagation": o.propagation,
                            "diagnostics": o.diagnostics,
                        })
                    })
                })
                .collect();
            let trending: Vec<_> = trending
                .iter()
                .map(|(fp, count)| serde_json::json!({ "fingerprint": fp, "velocity": count }))
                .collect();
            return self.json(&serde_json::json!({
                "mentions": observations.len(),
                "escalations": escalations,
                "verdicts": verdicts,
                "trending": trending,
            }));
        }

        let escalated = observations.iter().filter(|o| o.escalation.is_some()).count();
        let mut lines = vec![self.success(&format!(
            "Observed {} mention(s), escalated {}",
            observations.len(),
            escalated
        ))];

        if !verdicts.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Claim", "Verdict", "Confidence", "Review"]);
            for v in verdicts {
                builder.push_record([
                    truncate(&v.claim_text, 50),
                    v.status.to_string(),
                    format!("{:.1}", v.confidence),
                    if v.expert_review_required { "yes" } else { "no" }.to_string(),
                ]);
            }
            lines.push(Self::table(builder));
        }

        if !trending.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Fingerprint", "Mentions"]);
            for (fp, count) in trending {
                builder.push_record([truncate(fp.as_str(), 16), count.to_string()]);
            }
            lines.push(Self::table(builder));
        }

        for o in observations {
            for note in &o.diagnostics {
                lines.push(self.warning(note));
            }
        }
        Ok(lines.join("\n"))
    }

    fn status(&self, status: VerificationStatus) -> String {
        let color = match status {
            VerificationStatus::True => "green",
            VerificationStatus::False => "red",
            VerificationStatus::Misleading => "magenta",
            VerificationStatus::Unverified | VerificationStatus::Outdated => "yellow",
        };
        self.colorize(status.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use factline_domain::{Claim, ClaimCategory};

    fn verdict() -> VerificationResult {
        let claim = Claim::new("The reservoir is poisoned", ClaimCategory::SafetySecurity);
        let mut result = VerificationResult::no_evidence(&claim, 1_700_000_000);
        result.expert_review_required = true;
        result.review_reason = Some("Imminent-harm claim".to_string());
        result
    }

    #[test]
    fn test_verification_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_verification(&verdict()).unwrap();
        assert!(output.contains("Verdict:     unverified"));
        assert!(output.contains("Expert review required: Imminent-harm claim"));
    }

    #[test]
    fn test_verification_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_verification(&verdict()).unwrap();
        let parsed: VerificationResult = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.status, VerificationStatus::Unverified);
    }

    #[test]
    fn test_missing_patient_zero() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(
            formatter.format_patient_zero(None).unwrap(),
            "No post carries this claim."
        );
    }

    #[test]
    fn test_empty_coordination() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_coordination(&CoordinationReport::default()).unwrap();
        assert_eq!(output, "✓ No coordinated behaviour found.");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.error("test"), "✗ test");
    }
}
