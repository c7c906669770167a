//! Gridtopo CLI - Command-line interface
//!
//! Runs the substation/generator topology pipeline and inspects its
//! configuration.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;
use errors::CliError;

fn main() {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(commands::execute(cli)));

    if let Err(err) = result {
        match err.downcast_ref::<CliError>() {
            Some(cli_error) => cli_error.display(),
            None => CliError::new(format!("{:#}", err)).display(),
        }
        std::process::exit(1);
    }
}
