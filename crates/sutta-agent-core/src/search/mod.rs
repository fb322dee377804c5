//! Passage retrieval
//!
//! Provides:
//! - The `PassageStore` nearest-neighbour contract and the passage model
//! - A SQLite-backed store with cosine similarity over stored embeddings
//! - Exhaustive search that ranks whole documents instead of passages
//! - Snippet extraction for result display

mod exhaustive;
mod snippet;
mod vector;

pub use exhaustive::{
    group_by_document, DocumentGroup, ExhaustiveResults, ExhaustiveSearch, GroupSnippet,
    MAX_RESULT_LIMIT, MIN_RESULT_LIMIT,
};
pub use snippet::*;
pub use vector::SqlitePassageStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structural metadata attached to a passage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassageMetadata {
    /// Document title (e.g. "Satipaṭṭhāna Sutta")
    pub title: String,
    /// Position inside the document (e.g. segment range "mn10:1.1-mn10:3.4")
    pub position: String,
}

/// A retrievable unit of source text scored against a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: String,
    pub document_id: String,
    pub text: String,
    /// Similarity to the query, 0.0 - 1.0, higher is more relevant
    pub score: f64,
    pub metadata: PassageMetadata,
}

impl Passage {
    pub fn new(
        document_id: impl Into<String>,
        position: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        score: f64,
    ) -> Self {
        let document_id = document_id.into();
        let position = position.into();
        Self {
            id: Self::derive_id(&document_id, &position),
            document_id,
            text: text.into(),
            score,
            metadata: PassageMetadata {
                title: title.into(),
                position,
            },
        }
    }

    /// Stable passage id from its document and position
    pub fn derive_id(document_id: &str, position: &str) -> String {
        format!("{}#{}", document_id, position)
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn position(&self) -> &str {
        &self.metadata.position
    }
}

/// Query text plus passage ids the caller has already consumed
#[derive(Debug, Clone, Default)]
pub struct Query {
    text: String,
    exclude: HashSet<String>,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exclude: HashSet::new(),
        }
    }

    /// Add passage ids that must never be returned for this query
    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude.contains(id)
    }
}

/// Nearest-neighbour passage index
///
/// Implementations return the top `k` passages for `text`, best first.
/// An empty result is a valid answer, not an error.
#[async_trait]
pub trait PassageStore: Send + Sync {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Passage>>;

    /// Number of indexed passages, if the store can tell
    async fn passage_count(&self) -> Result<Option<usize>> {
        Ok(None)
    }
}
