//! Fetchgraph CLI: the `fetchgraph` command.

mod cli;
mod commands;
mod config;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;

fn main() {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    support::init_tracing(config.log_level());
    let catalog = config.catalog_path(cli.catalog);
    tracing::debug!(catalog = %catalog, "using catalog");

    match cli.command {
        Commands::Check { json } => commands::check::run(&catalog, config.json_output(json)),

        Commands::List { type_name, json } => {
            commands::list::run(&catalog, type_name, config.json_output(json))
        }

        Commands::Resolve { name, json } => {
            commands::resolve::run(&catalog, &name, config.json_output(json))
        }

        Commands::Plan {
            name,
            runtime_type,
            semantic,
            json,
        } => commands::plan::run(
            &catalog,
            &name,
            runtime_type,
            semantic,
            config.json_output(json),
        ),

        Commands::Merge { names, json } => {
            commands::merge::run(&catalog, &names, config.json_output(json))
        }
    }
}
