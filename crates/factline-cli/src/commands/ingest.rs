//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::commands::seed::read_records;
use crate::error::Result;
use crate::output::Formatter;
use crate::runtime::Runtime;
use factline_domain::{Claim, ClaimCategory};
use factline_propagation::PostRecord;
use factline_sentinel::Mention;
use serde::Deserialize;

/// One line of a mentions file.
#[derive(Debug, Deserialize)]
struct MentionDefinition {
    text: String,
    #[serde(default)]
    category: ClaimCategory,
    #[serde(default)]
    post: Option<PostRecord>,
}

impl MentionDefinition {
    fn into_mention(self) -> Mention {
        Mention {
            claim: Claim::new(self.text, self.category),
            post: self.post,
        }
    }
}

/// Execute the ingest command.
///
/// Mentions are observed in file order. Escalated claims are verified
/// afterwards unless `--no-drain` is given.
pub async fn execute_ingest(args: IngestArgs, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    let definitions: Vec<MentionDefinition> = read_records(&args.file)?;
    let mut sentinel = runtime.sentinel()?;

    let mut observations = Vec::with_capacity(definitions.len());
    for definition in definitions {
        observations.push(sentinel.observe(definition.into_mention()).await);
    }
    tracing::info!("{}", sentinel.metrics().summary());

    let verdicts = if args.no_drain {
        Vec::new()
    } else {
        let mut worker = runtime.worker();
        let verdicts = worker.drain().await?;
        tracing::info!("{}", worker.metrics().summary());
        verdicts
    };

    let trending = match sentinel.tracker().trending(args.min_velocity).await {
        Ok(found) => found,
        Err(e) => {
            eprintln!("{}", formatter.warning(&format!("trending scan failed: {}", e)));
            Vec::new()
        }
    };

    println!("{}", formatter.format_ingest(&observations, &verdicts, &trending)?);
    Ok(())
}
