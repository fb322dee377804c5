//! Sutta Agent Core Library
//!
//! Iterative research over an indexed corpus of Pali Canon discourses.
//!
//! # Features
//! - Vector similarity retrieval over SQLite-stored passage embeddings
//! - Multi-round research with LLM gap analysis and query refinement
//! - Cited answer synthesis through an OpenAI-compatible LLM service
//! - Long-term answer memory recalled by question similarity
//! - Exhaustive document-level search without synthesis

pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod memory;
pub mod research;
pub mod search;

pub use agent::{AgentStatus, ResearchAgent};
pub use config::{Config, LLMServiceConfig, ResearchConfig};
pub use db::{Database, MemoryRecord};
pub use error::{AgentError, Error, ResearchPhase, Result};
pub use llm::{
    ChatMessage, Embedder, HttpEmbedder, HttpSynthesizer, LLMClient, MetricsSnapshot,
    Synthesizer, VLLMClient,
};
pub use memory::{MemoryStore, RecalledAnswer};
pub use research::{
    Citation, GapAnalysis, ProgressCallback, ResearchOrchestrator, ResearchOutcome,
    ResearchProgress, StopReason, SynthesizedAnswer,
};
pub use search::{
    DocumentGroup, ExhaustiveResults, ExhaustiveSearch, Passage, PassageStore, Query,
    SqlitePassageStore,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "sutta-agent";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "sutta-agent";
