//! Seed command implementations.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::runtime::Runtime;
use factline_propagation::PostRecord;
use factline_verifier::NewSource;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a JSON array of records from `path`.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data = fs::read_to_string(path)?;
    let records: Vec<T> = serde_json::from_str(&data)?;
    if records.is_empty() {
        return Err(CliError::InvalidInput(format!("{} holds no records", path.display())));
    }
    Ok(records)
}

/// Execute the seed-corpus command.
///
/// Every source is attempted; failures are reported and the rest still load.
pub async fn execute_seed_corpus(path: &Path, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    let sources: Vec<NewSource> = read_records(path)?;
    let total = sources.len();
    let mut added = 0;

    for source in sources {
        let title = source.title.clone();
        match runtime.verifier.add_source(source).await {
            Ok(id) => {
                tracing::debug!("added source {}", id);
                added += 1;
            }
            Err(e) => eprintln!("{}", formatter.error(&format!("{}: {}", title, e))),
        }
    }

    println!("{}", formatter.success(&format!("Added {} of {} source(s)", added, total)));
    Ok(())
}

/// Execute the seed-graph command.
pub async fn execute_seed_graph(path: &Path, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    let records: Vec<PostRecord> = read_records(path)?;
    let total = records.len();

    for record in records {
        runtime.propagation.ingest(record).await?;
    }

    println!("{}", formatter.success(&format!("Ingested {} post(s)", total)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"[{ "title": "WHO", "content": "Vaccines are safe.", "source_type": "medical", "credibility": "high" }]"#,
        )
        .unwrap();

        let sources: Vec<NewSource> = read_records(&path).unwrap();
        assert_eq!(sources[0].title, "WHO");
        assert!(sources[0].url.is_none());
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "[]").unwrap();
        assert!(matches!(read_records::<PostRecord>(&path), Err(CliError::InvalidInput(_))));
    }
}
