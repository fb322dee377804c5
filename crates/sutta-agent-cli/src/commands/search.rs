//! Exhaustive search command

use crate::app::{OutputFormat, SearchArgs};
use crate::output::format_search_results;
use anyhow::Result;
use sutta_agent_core::{Config, ResearchAgent};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let query = args.query.join(" ");
    let agent = ResearchAgent::from_config(config)?;

    let results = agent.exhaustive_search(&query, args.limit).await?;
    print!("{}", format_search_results(&results, format));
    Ok(())
}
