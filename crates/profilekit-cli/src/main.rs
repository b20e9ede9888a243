mod cli;
mod commands;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use commands::LoadOptions;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let options = LoadOptions::new(cli.source.as_deref(), cli.cache.as_deref());

    match &cli.command {
        Commands::Show {
            category,
            name,
            exact,
            json,
        } => {
            commands::Show::execute(category, name.as_deref(), *exact, *json, &options)
                .context("Failed to execute show command")?;
        }
        Commands::List => {
            commands::List::execute(&options).context("Failed to execute list command")?;
        }
        Commands::Check => {
            commands::Check::execute(&options).context("Failed to execute check command")?;
        }
    }

    Ok(())
}
