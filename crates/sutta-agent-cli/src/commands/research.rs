//! Research command

use crate::app::{OutputFormat, ResearchArgs};
use crate::output::format_outcome;
use crate::progress::ProgressReporter;
use anyhow::Result;
use std::sync::Arc;
use sutta_agent_core::{Config, ResearchAgent};
use tokio_util::sync::CancellationToken;

pub async fn run(args: ResearchArgs, mut config: Config, format: OutputFormat) -> Result<()> {
    let question = args.question.join(" ");

    if let Some(max) = args.max_iterations {
        config.research.max_iterations = max;
    }
    if args.no_memory {
        config.research.memory_enabled = false;
    }
    config.research.validate()?;

    let mut agent = ResearchAgent::from_config(&config)?;
    if format == OutputFormat::Cli {
        agent = agent.with_progress(Arc::new(ProgressReporter::report));
    }

    // Ctrl-C stops the research at its next phase boundary
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling research");
            on_interrupt.cancel();
        }
    });

    let result = agent.research_with_cancel(&question, &cancel).await;
    watcher.abort();

    let outcome = result?;
    print!("{}", format_outcome(&outcome, format));
    Ok(())
}
