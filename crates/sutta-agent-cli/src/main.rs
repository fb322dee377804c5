//! Sutta Agent CLI
//!
//! Iterative, cited research over the Pali Canon.

use anyhow::Result;
use clap::Parser;
use sutta_agent_core::{AgentError, Config};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<AgentError>()
            .map_or(sutta_agent_core::error::exit_codes::GENERAL_ERROR, AgentError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Research(args) => commands::research::run(args, config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Memory(args) => commands::memory::run(args, &config, cli.format).await,
        Commands::Status => commands::status::run(&config, cli.format).await,
    }
}
