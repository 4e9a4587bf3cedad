//! tfdocs CLI - Terraform provider documentation lookup
//!
//! Entry point for the `tfdocs` command-line interface. Command
//! implementations live in [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    execute_command(cli).await
}

async fn execute_command(cli: Cli) -> Result<()> {
    let service = commands::build_service(cli.config.as_deref())?;
    let format = cli.format;

    match cli.command {
        Commands::Search { query, limit } => {
            commands::execute_search(&service, &query, limit, format)?;
        },
        Commands::Docs { kind, type_name } => {
            commands::execute_docs(&service, kind, &type_name, format).await?;
        },
        Commands::Example {
            kind,
            type_name,
            index,
        } => {
            commands::execute_example(&service, kind, &type_name, index, format).await?;
        },
        Commands::Version { provider } => {
            commands::execute_version(&service, &provider, format).await?;
        },
        Commands::Providers => {
            commands::execute_providers(&service, format)?;
        },
    }

    Ok(())
}
