//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use sutta_agent_core::{AgentStatus, ExhaustiveResults, ResearchOutcome};

/// Format a research answer
pub fn format_outcome(outcome: &ResearchOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_outcome(outcome),
        OutputFormat::Cli => terminal::format_outcome(outcome),
    }
}

/// Format exhaustive search results
pub fn format_search_results(results: &ExhaustiveResults, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_search_results(results),
        OutputFormat::Cli => terminal::format_search_results(results),
    }
}

pub fn format_status(status: &AgentStatus, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::to_pretty(status),
        OutputFormat::Cli => terminal::format_status(status),
    }
}
