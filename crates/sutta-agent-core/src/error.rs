//! Error types for sutta-agent

use std::fmt;
use thiserror::Error;

/// Result type alias using AgentError
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type alias for convenience
pub type Error = AgentError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const SERVICE_UNAVAILABLE: i32 = 4;
    pub const CANCELLED: i32 = 130;
}

/// Phase of a research run, used for progress reporting and error context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchPhase {
    Recall,
    Search,
    Analyze,
    Synthesize,
    Learn,
    Complete,
}

impl ResearchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recall => "recall",
            Self::Search => "search",
            Self::Analyze => "analyze",
            Self::Synthesize => "synthesize",
            Self::Learn => "learn",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for sutta-agent
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Passage store unavailable during {phase} for question {question:?}: {reason}")]
    RetrievalUnavailable {
        question: String,
        phase: ResearchPhase,
        reason: String,
    },

    #[error("Gap analysis degraded: {0}")]
    AnalysisDegraded(String),

    #[error("Synthesis failed during {phase} for question {question:?}: {reason}")]
    SynthesisFailed {
        question: String,
        phase: ResearchPhase,
        reason: String,
    },

    #[error("Memory read failed: {0}")]
    MemoryReadFailed(String),

    #[error("Memory write failed: {0}")]
    MemoryWriteFailed(String),

    #[error("Research cancelled during {phase} for question {question:?}")]
    Cancelled {
        question: String,
        phase: ResearchPhase,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::RetrievalUnavailable { .. } | Self::SynthesisFailed { .. } => {
                exit_codes::SERVICE_UNAVAILABLE
            }
            Self::Cancelled { .. } => exit_codes::CANCELLED,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Phase in which a propagated research error occurred, if known
    pub fn phase(&self) -> Option<ResearchPhase> {
        match self {
            Self::RetrievalUnavailable { phase, .. }
            | Self::SynthesisFailed { phase, .. }
            | Self::Cancelled { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Question a propagated research error belongs to, if known
    pub fn question(&self) -> Option<&str> {
        match self {
            Self::RetrievalUnavailable { question, .. }
            | Self::SynthesisFailed { question, .. }
            | Self::Cancelled { question, .. } => Some(question),
            _ => None,
        }
    }

    /// Re-attribute a research error to the top-level question.
    ///
    /// Lower layers only know the query they were handed; the orchestrator
    /// rewrites the context so callers can retry the original question.
    pub fn for_question(self, original: &str) -> Self {
        match self {
            Self::RetrievalUnavailable { phase, reason, .. } => Self::RetrievalUnavailable {
                question: original.to_string(),
                phase,
                reason,
            },
            Self::SynthesisFailed { phase, reason, .. } => Self::SynthesisFailed {
                question: original.to_string(),
                phase,
                reason,
            },
            Self::Cancelled { phase, .. } => Self::Cancelled {
                question: original.to_string(),
                phase,
            },
            other => other,
        }
    }
}
