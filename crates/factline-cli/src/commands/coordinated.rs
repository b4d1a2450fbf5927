//! Coordinated command implementation.

use crate::cli::CoordinatedArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::runtime::Runtime;
use factline_domain::now_secs;

/// Execute the coordinated command.
pub async fn execute_coordinated(args: CoordinatedArgs, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    let at = args.at.unwrap_or_else(now_secs);
    let report = runtime.propagation.coordinated_behaviour(at).await;
    println!("{}", formatter.format_coordination(&report)?);
    Ok(())
}
