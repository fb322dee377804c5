//! Long-term answer memory
//!
//! Persists synthesized answers and recalls them for semantically similar
//! questions. The store is append-only: answers for near-duplicate
//! questions coexist and recall returns the best match above a
//! conservative threshold. A missed recall only costs a fresh research
//! run, while a false hit returns a mismatched answer.

use crate::db::vectors::cosine_similarity;
use crate::db::Database;
use crate::error::{AgentError, Result};
use crate::llm::Embedder;
use crate::research::SynthesizedAnswer;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// An answer returned from memory
#[derive(Debug, Clone, Serialize)]
pub struct RecalledAnswer {
    pub record_id: String,
    pub similarity: f32,
    pub answer: SynthesizedAnswer,
}

/// Process-wide answer cache shared by concurrent research sessions
pub struct MemoryStore {
    db: Mutex<Database>,
    embedder: Arc<dyn Embedder>,
    threshold: f32,
}

impl MemoryStore {
    pub fn new(db: Database, embedder: Arc<dyn Embedder>, threshold: f32) -> Self {
        Self {
            db: Mutex::new(db),
            embedder,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, Database>, String> {
        self.db
            .lock()
            .map_err(|_| "memory store lock poisoned".to_string())
    }

    /// Best stored answer for `question`, if its similarity reaches the threshold
    pub async fn recall(&self, question: &str) -> Result<Option<RecalledAnswer>> {
        // Exact (normalized) matches need no embedding round-trip
        let exact = {
            let db = self.lock().map_err(AgentError::MemoryReadFailed)?;
            db.find_memory_by_question(question)
                .map_err(|e| AgentError::MemoryReadFailed(e.to_string()))?
        };
        if let Some(record) = exact {
            tracing::debug!("Exact memory hit {} for {:?}", record.id, question);
            return Ok(Some(RecalledAnswer {
                record_id: record.id,
                similarity: 1.0,
                answer: record.answer,
            }));
        }

        let embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| AgentError::MemoryReadFailed(e.to_string()))?;

        let records = {
            let db = self.lock().map_err(AgentError::MemoryReadFailed)?;
            db.get_memory_records()
                .map_err(|e| AgentError::MemoryReadFailed(e.to_string()))?
        };

        let best = records
            .into_iter()
            .map(|r| (cosine_similarity(&embedding, &r.question_embedding), r))
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            Some((similarity, record)) if similarity >= self.threshold => {
                tracing::debug!(
                    "Memory hit {} (similarity {:.3}) for {:?}",
                    record.id,
                    similarity,
                    question
                );
                Ok(Some(RecalledAnswer {
                    record_id: record.id,
                    similarity,
                    answer: record.answer,
                }))
            }
            Some((similarity, _)) => {
                tracing::debug!(
                    "Memory miss for {:?}: best similarity {:.3} below {:.3}",
                    question,
                    similarity,
                    self.threshold
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Append an answer for `question`. Returns the new record id.
    pub async fn save(&self, question: &str, answer: &SynthesizedAnswer) -> Result<String> {
        let embedding = self
            .embedder
            .embed(question)
            .await
            .map_err(|e| AgentError::MemoryWriteFailed(e.to_string()))?;

        let db = self.lock().map_err(AgentError::MemoryWriteFailed)?;
        let id = db
            .insert_memory_record(question, &embedding, answer)
            .map_err(|e| AgentError::MemoryWriteFailed(e.to_string()))?;

        tracing::info!("Saved answer for {:?} to memory as {}", question, id);
        Ok(id)
    }

    /// Remove every stored answer. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let db = self.lock().map_err(AgentError::MemoryWriteFailed)?;
        let removed = db
            .clear_memory_records()
            .map_err(|e| AgentError::MemoryWriteFailed(e.to_string()))?;
        tracing::info!("Cleared {} memory records", removed);
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let db = self.lock().map_err(AgentError::MemoryReadFailed)?;
        db.count_memory_records()
            .map_err(|e| AgentError::MemoryReadFailed(e.to_string()))
    }
}
