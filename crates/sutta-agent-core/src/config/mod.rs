//! Configuration management

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Research loop tuning
    #[serde(default)]
    pub research: ResearchConfig,

    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Database path override (defaults to the cache directory)
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Tuning knobs for the research loop, memory recall and exhaustive search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Upper bound on retrieval rounds per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Passages requested per retrieval round
    #[serde(default = "default_batch_size")]
    pub retrieval_batch_size: usize,

    /// Minimum cosine similarity for a memory hit
    #[serde(default = "default_recall_threshold")]
    pub recall_similarity_threshold: f32,

    /// Default passage count for exhaustive search
    #[serde(default = "default_exhaustive_limit")]
    pub exhaustive_search_limit: usize,

    /// Timeout applied to every store / synthesizer call
    #[serde(default = "default_call_timeout")]
    pub per_call_timeout_secs: u64,

    /// Multiplier on the batch size when fetching candidates
    #[serde(default = "default_over_fetch")]
    pub over_fetch_factor: f64,

    /// Optional wall-clock budget for the whole search loop
    #[serde(default)]
    pub time_budget_secs: Option<u64>,

    /// Max characters of evidence sent to the synthesizer
    #[serde(default = "default_digest_budget")]
    pub digest_char_budget: usize,

    /// Max characters per passage inside a digest
    #[serde(default = "default_passage_limit")]
    pub passage_char_limit: usize,

    /// Whether answers are recalled from and saved to memory
    #[serde(default = "default_true")]
    pub memory_enabled: bool,
}

fn default_max_iterations() -> usize {
    5
}

fn default_batch_size() -> usize {
    10
}

fn default_recall_threshold() -> f32 {
    0.92
}

fn default_exhaustive_limit() -> usize {
    200
}

fn default_call_timeout() -> u64 {
    60
}

fn default_over_fetch() -> f64 {
    1.5
}

fn default_digest_budget() -> usize {
    12_000
}

fn default_passage_limit() -> usize {
    1_500
}

fn default_true() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            retrieval_batch_size: default_batch_size(),
            recall_similarity_threshold: default_recall_threshold(),
            exhaustive_search_limit: default_exhaustive_limit(),
            per_call_timeout_secs: default_call_timeout(),
            over_fetch_factor: default_over_fetch(),
            time_budget_secs: None,
            digest_char_budget: default_digest_budget(),
            passage_char_limit: default_passage_limit(),
            memory_enabled: true,
        }
    }
}

impl ResearchConfig {
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_secs(self.per_call_timeout_secs)
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }

    /// Reject settings the research loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AgentError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.retrieval_batch_size == 0 {
            return Err(AgentError::Config(
                "retrieval_batch_size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.recall_similarity_threshold) {
            return Err(AgentError::Config(format!(
                "recall_similarity_threshold must be within 0.0..=1.0, got {}",
                self.recall_similarity_threshold
            )));
        }
        if self.over_fetch_factor < 1.0 {
            return Err(AgentError::Config(format!(
                "over_fetch_factor must be >= 1.0, got {}",
                self.over_fetch_factor
            )));
        }
        if self.per_call_timeout_secs == 0 {
            return Err(AgentError::Config(
                "per_call_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.digest_char_budget == 0 || self.passage_char_limit == 0 {
            return Err(AgentError::Config(
                "digest limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions (gap analysis, synthesis)
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature for completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("SUTTA_AGENT_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("SUTTA_AGENT_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("SUTTA_AGENT_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("SUTTA_AGENT_LLM_API_KEY").ok(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("SUTTA_AGENT_LLM_MODEL").unwrap_or_else(|_| "llama3.1:8b".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("SUTTA_AGENT_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "nomic-embed-text".to_string())
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout() -> u64 {
    120
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_yaml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.research.validate()?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Database path, honouring `SUTTA_AGENT_DB` and the config override
    pub fn database_path(&self) -> PathBuf {
        std::env::var("SUTTA_AGENT_DB")
            .map(PathBuf::from)
            .ok()
            .or_else(|| self.database_path.clone())
            .unwrap_or_else(crate::Database::default_path)
    }
}
