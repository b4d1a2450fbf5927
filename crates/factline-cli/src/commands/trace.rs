//! Trace and patient-zero command implementations.

use crate::cli::{PatientZeroArgs, TraceArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::runtime::Runtime;

/// Execute the trace command.
pub async fn execute_trace(args: TraceArgs, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    let depth = args.depth.unwrap_or(runtime.config.propagation.max_depth);
    let report = runtime.propagation.report(&args.post_id, depth).await;
    if report.patient_zero.is_none() && report.tree.is_empty() && !report.is_degraded() {
        return Err(CliError::InvalidInput(format!("Unknown post '{}'", args.post_id)));
    }
    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Execute the patient-zero command.
pub async fn execute_patient_zero(args: PatientZeroArgs, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    if args.report {
        let depth = runtime.config.propagation.max_depth;
        match runtime.propagation.trace_claim(&args.claim, depth).await? {
            Some(report) => println!("{}", formatter.format_report(&report)?),
            None => println!("{}", formatter.format_patient_zero(None)?),
        }
        return Ok(());
    }

    let found = runtime.propagation.patient_zero(&args.claim).await?;
    println!("{}", formatter.format_patient_zero(found.as_ref())?);
    Ok(())
}
