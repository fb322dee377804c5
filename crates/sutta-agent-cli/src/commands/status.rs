//! Status command

use crate::app::OutputFormat;
use crate::output::format_status;
use anyhow::Result;
use sutta_agent_core::{Config, ResearchAgent};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let agent = ResearchAgent::from_config(config)?;
    let status = agent.status().await?;
    print!("{}", format_status(&status, format));
    Ok(())
}
