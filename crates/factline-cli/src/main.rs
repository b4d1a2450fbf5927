//! Factline CLI - verify crisis claims and trace how they spread.

use clap::Parser;
use factline_cli::commands;
use factline_cli::{Cli, Command, Config, Formatter, Runtime};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> factline_cli::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let runtime = Runtime::open(config)?;

    match cli.command {
        Command::Verify(args) => commands::execute_verify(args, &runtime, &formatter).await?,
        Command::Trace(args) => commands::execute_trace(args, &runtime, &formatter).await?,
        Command::PatientZero(args) => commands::execute_patient_zero(args, &runtime, &formatter).await?,
        Command::Coordinated(args) => commands::execute_coordinated(args, &runtime, &formatter).await?,
        Command::SeedCorpus(args) => commands::execute_seed_corpus(&args.file, &runtime, &formatter).await?,
        Command::SeedGraph(args) => commands::execute_seed_graph(&args.file, &runtime, &formatter).await?,
        Command::Ingest(args) => commands::execute_ingest(args, &runtime, &formatter).await?,
    }

    Ok(())
}
