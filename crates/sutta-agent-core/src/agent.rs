//! Caller-facing research agent

use crate::config::{Config, ResearchConfig};
use crate::db::Database;
use crate::error::Result;
use crate::llm::{HttpEmbedder, HttpSynthesizer, LLMClient, Synthesizer, VLLMClient};
use crate::memory::MemoryStore;
use crate::research::{ProgressCallback, ResearchOrchestrator, ResearchOutcome};
use crate::search::{ExhaustiveResults, ExhaustiveSearch, PassageStore, SqlitePassageStore};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Readiness report for the agent's backing stores
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    /// Indexed passages, when the store can report it
    pub passage_count: Option<usize>,
    pub memory_count: usize,
    pub memory_enabled: bool,
    pub model: String,
    /// True once the index holds at least one passage
    pub ready: bool,
}

/// Research agent over an indexed sutta corpus
pub struct ResearchAgent {
    orchestrator: ResearchOrchestrator,
    exhaustive: ExhaustiveSearch,
    store: Arc<dyn PassageStore>,
    memory: Arc<MemoryStore>,
    model: String,
    config: ResearchConfig,
}

impl ResearchAgent {
    pub fn new(
        store: Arc<dyn PassageStore>,
        synthesizer: Arc<dyn Synthesizer>,
        memory: Arc<MemoryStore>,
        config: ResearchConfig,
    ) -> Self {
        let model = synthesizer.model_name().to_string();
        let orchestrator = ResearchOrchestrator::new(
            store.clone(),
            synthesizer,
            Some(memory.clone()),
            config.clone(),
        );
        let exhaustive = ExhaustiveSearch::new(store.clone(), config.per_call_timeout());

        Self {
            orchestrator,
            exhaustive,
            store,
            memory,
            model,
            config,
        }
    }

    /// Wire the SQLite index and memory to the configured LLM service
    pub fn from_config(config: &Config) -> Result<Self> {
        let db_path = config.database_path();
        tracing::debug!("Opening database at {}", db_path.display());

        let index_db = Database::open(&db_path)?;
        index_db.initialize()?;
        let memory_db = Database::open(&db_path)?;
        memory_db.initialize()?;

        let client: Arc<dyn LLMClient> = Arc::new(VLLMClient::new(config.llm_service.clone())?);
        let embedder = Arc::new(HttpEmbedder::new(client.clone()));
        let synthesizer = Arc::new(HttpSynthesizer::new(client));

        let store = Arc::new(SqlitePassageStore::new(index_db, embedder.clone()));
        let memory = Arc::new(MemoryStore::new(
            memory_db,
            embedder,
            config.research.recall_similarity_threshold,
        ));

        Ok(Self::new(store, synthesizer, memory, config.research.clone()))
    }

    /// Receive progress notifications during research
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.orchestrator = self.orchestrator.with_progress(callback);
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    pub async fn research(&self, question: &str) -> Result<ResearchOutcome> {
        self.orchestrator.research(question).await
    }

    pub async fn research_with_cancel(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<ResearchOutcome> {
        self.orchestrator.research_with_cancel(question, cancel).await
    }

    /// Document-level search; `limit` defaults to `exhaustive_search_limit`
    pub async fn exhaustive_search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<ExhaustiveResults> {
        let limit = limit.unwrap_or(self.config.exhaustive_search_limit);
        self.exhaustive.search(query, limit).await
    }

    pub fn clear_memory(&self) -> Result<usize> {
        self.memory.clear()
    }

    pub fn memory_count(&self) -> Result<usize> {
        self.memory.count()
    }

    pub async fn status(&self) -> Result<AgentStatus> {
        let passage_count = self.store.passage_count().await?;
        Ok(AgentStatus {
            passage_count,
            memory_count: self.memory.count()?,
            memory_enabled: self.config.memory_enabled,
            model: self.model.clone(),
            ready: passage_count.map_or(true, |n| n > 0),
        })
    }
}
