//! Verify command implementation.

use crate::cli::VerifyArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::runtime::Runtime;
use factline_domain::Claim;

/// Execute the verify command.
pub async fn execute_verify(args: VerifyArgs, runtime: &Runtime, formatter: &Formatter) -> Result<()> {
    if args.claim.trim().is_empty() {
        return Err(CliError::InvalidInput("Claim text is empty".to_string()));
    }
    let claim = Claim::new(args.claim, args.category.into());
    let result = runtime.verifier.verify(&claim).await?;
    println!("{}", formatter.format_verification(&result)?);
    Ok(())
}
