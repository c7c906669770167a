//! Command implementations

mod config;
mod run;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run(args) => run::execute(args, config_path, &output, cli.dry_run).await,
        Commands::Config => config::execute(config_path, &output),
    }
}
