use clap::Parser;
use leaf_histogram::cli::{execute_run, Cli, RunConfig};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,leaf_histogram=debug"
    } else {
        "warn,leaf_histogram=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute_run(RunConfig::from_cli(&cli)).await {
        Ok(summary) if summary.has_failures() => {
            tracing::error!(
                failed = summary.failures.len(),
                "some leaf directories could not be processed"
            );
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("❌ {error:#}");
            ExitCode::FAILURE
        }
    }
}
