//! Vector similarity passage store
//!
//! Computes cosine similarity between the query embedding and stored
//! passage embeddings.

use super::{Passage, PassageStore};
use crate::db::vectors::top_k_by_similarity;
use crate::db::Database;
use crate::error::{AgentError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// `PassageStore` over the `passages` table of a sutta-agent database
pub struct SqlitePassageStore {
    db: Mutex<Database>,
    embedder: Arc<dyn Embedder>,
}

impl SqlitePassageStore {
    pub fn new(db: Database, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            db: Mutex::new(db),
            embedder,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| AgentError::ExternalError("passage store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PassageStore for SqlitePassageStore {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Passage>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        // Embed before taking the lock so the connection is never held across an await
        let query_embedding = self.embedder.embed(&format_query_for_embedding(text)).await?;

        let db = self.lock()?;
        let stored = db.get_passage_embeddings()?;
        if stored.is_empty() {
            return Ok(Vec::new());
        }

        let top = top_k_by_similarity(&query_embedding, stored, k);
        tracing::debug!(
            "Vector query {:?}: {} candidates, best {:?}",
            text,
            top.len(),
            top.first().map(|(_, s)| *s)
        );

        db.get_scored_passages(&top)
    }

    async fn passage_count(&self) -> Result<Option<usize>> {
        Ok(Some(self.lock()?.count_passages()?))
    }
}

/// Format query for embedding (matches document format)
fn format_query_for_embedding(query: &str) -> String {
    format!("search_query: {}", query)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maps a handful of keywords onto fixed axes
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let t = text.to_lowercase();
            Ok(vec![
                if t.contains("breath") { 1.0 } else { 0.0 },
                if t.contains("kindness") { 1.0 } else { 0.0 },
                0.1,
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "keyword"
        }
    }

    fn store() -> SqlitePassageStore {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.insert_passage(
            &Passage::new("mn118", "1", "Mindfulness of Breathing", "breathing in long", 0.0),
            "keyword",
            &[1.0, 0.0, 0.1],
        )
        .unwrap();
        db.insert_passage(
            &Passage::new("snp1.8", "1", "Metta Sutta", "loving kindness", 0.0),
            "keyword",
            &[0.0, 1.0, 0.1],
        )
        .unwrap();
        SqlitePassageStore::new(db, Arc::new(KeywordEmbedder))
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let store = store();
        let results = store.query("breath meditation", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document_id, "mn118");
        assert!(results[0].score > results[1].score);
        assert!(results[0].score <= 1.0);
    }

    #[tokio::test]
    async fn test_query_respects_k() {
        let store = store();
        assert_eq!(store.query("kindness", 1).await.unwrap().len(), 1);
        assert!(store.query("kindness", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let store = SqlitePassageStore::new(db, Arc::new(KeywordEmbedder));
        assert!(store.query("anything", 5).await.unwrap().is_empty());
        assert_eq!(store.passage_count().await.unwrap(), Some(0));
    }
}
