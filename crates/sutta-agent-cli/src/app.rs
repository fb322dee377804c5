//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sutta-agent")]
#[command(
    author,
    version,
    about = "Research questions against the Pali Canon with cited, remembered answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "SUTTA_AGENT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Research a question, answering from memory when possible
    Research(ResearchArgs),

    /// List every document relevant to a query, without synthesis
    Search(SearchArgs),

    /// Inspect or clear remembered answers
    Memory(MemoryArgs),

    /// Show index and memory status
    Status,
}

#[derive(Args)]
pub struct ResearchArgs {
    /// Question to research
    #[arg(required = true)]
    pub question: Vec<String>,

    /// Override the maximum number of search rounds
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Neither recall from nor save to memory
    #[arg(long)]
    pub no_memory: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of passages to retrieve (10-500)
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct MemoryArgs {
    #[command(subcommand)]
    pub action: MemoryAction,
}

#[derive(Subcommand)]
pub enum MemoryAction {
    /// Number of remembered answers
    Count,
    /// Forget every remembered answer
    Clear {
        /// Skip the confirmation requirement
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
