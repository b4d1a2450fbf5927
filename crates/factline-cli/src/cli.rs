//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use factline_domain::ClaimCategory;
use std::path::PathBuf;

/// Factline - verify crisis claims and trace how they spread.
#[derive(Debug, Parser)]
#[command(name = "factline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.factline/config.toml)
    #[arg(short, long, global = true, env = "FACTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify a claim against the evidence corpus
    Verify(VerifyArgs),

    /// Report how an origin post spread
    Trace(TraceArgs),

    /// Find the earliest post carrying a claim
    PatientZero(PatientZeroArgs),

    /// Look for burst posting and identical-text clusters
    Coordinated(CoordinatedArgs),

    /// Add sources from a JSON file to the evidence corpus
    SeedCorpus(SeedArgs),

    /// Add posts from a JSON file to the social graph
    SeedGraph(SeedArgs),

    /// Replay mentions from a JSON file, escalating and verifying as they come
    Ingest(IngestArgs),
}

/// Arguments for the verify command.
#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Claim text
    pub claim: String,

    /// Claim category
    #[arg(short, long, value_enum, default_value = "other")]
    pub category: CategoryArg,
}

/// Arguments for the trace command.
#[derive(Debug, Parser)]
pub struct TraceArgs {
    /// Origin post ID
    pub post_id: String,

    /// Maximum reshare depth in the tree
    #[arg(short, long)]
    pub depth: Option<usize>,
}

/// Arguments for the patient-zero command.
#[derive(Debug, Parser)]
pub struct PatientZeroArgs {
    /// Claim text to search for
    pub claim: String,

    /// Also build the full propagation report
    #[arg(long)]
    pub report: bool,
}

/// Arguments for the coordinated command.
#[derive(Debug, Parser)]
pub struct CoordinatedArgs {
    /// Anchor time in unix seconds (default: now)
    #[arg(long)]
    pub at: Option<u64>,
}

/// Arguments for the seed commands.
#[derive(Debug, Parser)]
pub struct SeedArgs {
    /// JSON file to load
    pub file: PathBuf,
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// JSON file of mentions
    pub file: PathBuf,

    /// Leave escalated claims on the queue instead of verifying them
    #[arg(long)]
    pub no_drain: bool,

    /// Show fingerprints with at least this many mentions afterwards
    #[arg(long, default_value = "2")]
    pub min_velocity: u64,
}

/// Claim category argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CategoryArg {
    /// Health, disease, treatment
    Health,
    /// Elections, governments, conflict
    Political,
    /// Weather, disasters, climate
    Environmental,
    /// Markets, prices, jobs
    Economic,
    /// Crime, attacks, public safety
    Safety,
    /// Anything else
    Other,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<CategoryArg> for ClaimCategory {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::Health => ClaimCategory::HealthMedical,
            CategoryArg::Political => ClaimCategory::PoliticalGeopolitical,
            CategoryArg::Environmental => ClaimCategory::EnvironmentalClimate,
            CategoryArg::Economic => ClaimCategory::Economic,
            CategoryArg::Safety => ClaimCategory::SafetySecurity,
            CategoryArg::Other => ClaimCategory::Other,
        }
    }
}
