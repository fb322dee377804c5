//! Memory command

use crate::app::{MemoryAction, MemoryArgs, OutputFormat};
use anyhow::{bail, Result};
use sutta_agent_core::{Config, ResearchAgent};

pub async fn run(args: MemoryArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let agent = ResearchAgent::from_config(config)?;

    match args.action {
        MemoryAction::Count => {
            let count = agent.memory_count()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "memory_count": count })),
                OutputFormat::Cli => println!("{} remembered answers", count),
            }
        }
        MemoryAction::Clear { yes } => {
            if !yes {
                bail!("refusing to clear memory without --yes");
            }
            let removed = agent.clear_memory()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "removed": removed })),
                OutputFormat::Cli => println!("Removed {} remembered answers", removed),
            }
        }
    }
    Ok(())
}
