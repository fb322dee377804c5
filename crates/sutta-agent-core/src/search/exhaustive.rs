//! Exhaustive search - enumerate every document relevant to a query
//!
//! Unlike research, this performs a single high-volume retrieval and groups
//! the passages by document without any synthesis or memory interaction.
//! Useful for "list all suttas that mention X" style questions.

use super::{extract_snippet, Passage, PassageStore};
use crate::error::{AgentError, ResearchPhase, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Smallest passage count an exhaustive search will request
pub const MIN_RESULT_LIMIT: usize = 10;
/// Largest passage count an exhaustive search will request
pub const MAX_RESULT_LIMIT: usize = 500;
/// Snippets kept per document
const SNIPPETS_PER_DOCUMENT: usize = 3;
const SNIPPET_LENGTH: usize = 300;

/// One document's share of an exhaustive search
#[derive(Debug, Clone, Serialize)]
pub struct DocumentGroup {
    pub document_id: String,
    pub title: String,
    /// Best passage score in this document
    pub score: f64,
    /// Snippet of the best passage
    pub snippet: String,
    pub match_count: usize,
    /// Top snippets with their positions and scores, best first
    pub snippets: Vec<GroupSnippet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSnippet {
    pub text: String,
    pub position: String,
    pub score: f64,
}

/// Search results grouped by document, best document first
#[derive(Debug, Clone, Serialize)]
pub struct ExhaustiveResults {
    pub query: String,
    pub total_passages: usize,
    pub document_count: usize,
    pub groups: Vec<DocumentGroup>,
}

/// Single-shot retrieval grouped by document
pub struct ExhaustiveSearch {
    store: Arc<dyn PassageStore>,
    timeout: Duration,
}

impl ExhaustiveSearch {
    pub fn new(store: Arc<dyn PassageStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Retrieve up to `result_limit` passages (clamped to 10..=500) and rank
    /// the documents they belong to.
    pub async fn search(&self, query: &str, result_limit: usize) -> Result<ExhaustiveResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::InvalidInput(
                "search query must not be empty".to_string(),
            ));
        }

        let limit = result_limit.clamp(MIN_RESULT_LIMIT, MAX_RESULT_LIMIT);
        tracing::info!("Exhaustive search for {:?} (limit {})", query, limit);

        let passages = match tokio::time::timeout(self.timeout, self.store.query(query, limit)).await
        {
            Ok(Ok(passages)) => passages,
            Ok(Err(e)) => return Err(unavailable(query, e.to_string())),
            Err(_) => {
                return Err(unavailable(
                    query,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };

        let total_passages = passages.len();
        let groups = group_by_document(passages, query);

        tracing::debug!(
            "Exhaustive search: {} passages across {} documents",
            total_passages,
            groups.len()
        );

        Ok(ExhaustiveResults {
            query: query.to_string(),
            total_passages,
            document_count: groups.len(),
            groups,
        })
    }
}

fn unavailable(query: &str, reason: String) -> AgentError {
    AgentError::RetrievalUnavailable {
        question: query.to_string(),
        phase: ResearchPhase::Search,
        reason,
    }
}

/// Group passages by document. A document's score is its best passage's
/// score; groups are ordered by that score, descending.
pub fn group_by_document(passages: Vec<Passage>, query: &str) -> Vec<DocumentGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut by_doc: HashMap<String, Vec<Passage>> = HashMap::new();

    for passage in passages {
        let entry = by_doc.entry(passage.document_id.clone()).or_insert_with(|| {
            order.push(passage.document_id.clone());
            Vec::new()
        });
        entry.push(passage);
    }

    let mut groups: Vec<DocumentGroup> = order
        .into_iter()
        .filter_map(|doc_id| by_doc.remove(&doc_id).map(|p| build_group(doc_id, p, query)))
        .collect();

    groups.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.document_id.cmp(&b.document_id))
    });

    groups
}

fn build_group(document_id: String, mut passages: Vec<Passage>, query: &str) -> DocumentGroup {
    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let match_count = passages.len();
    let best = &passages[0];
    let title = if best.metadata.title.is_empty() {
        "Unknown".to_string()
    } else {
        best.metadata.title.clone()
    };

    let snippets: Vec<GroupSnippet> = passages
        .iter()
        .take(SNIPPETS_PER_DOCUMENT)
        .map(|p| GroupSnippet {
            text: extract_snippet(&p.text, query, Some(SNIPPET_LENGTH)).snippet,
            position: p.metadata.position.clone(),
            score: p.score,
        })
        .collect();

    DocumentGroup {
        document_id,
        title,
        score: best.score,
        snippet: snippets[0].text.clone(),
        match_count,
        snippets,
    }
}
