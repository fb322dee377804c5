//! Research data model

use crate::error::ResearchPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source reference for one cited document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub title: String,
    /// Position of the best supporting passage
    pub position: String,
    pub snippet: String,
    pub score: f64,
}

/// A finished, immutable answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedAnswer {
    pub answer_text: String,
    /// Ordered by first mention in the answer, no duplicates
    pub cited_document_ids: Vec<String>,
    /// Detail for each entry of `cited_document_ids`, same order
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub source_question: String,
    pub created_at: DateTime<Utc>,
}

impl SynthesizedAnswer {
    pub fn new(
        source_question: impl Into<String>,
        answer_text: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            answer_text: answer_text.into(),
            cited_document_ids: citations.iter().map(|c| c.document_id.clone()).collect(),
            citations,
            source_question: source_question.into(),
            created_at: Utc::now(),
        }
    }

    /// Explicit answer for questions where retrieval found nothing
    pub fn no_evidence(source_question: impl Into<String>) -> Self {
        Self::new(source_question, NO_EVIDENCE_ANSWER, Vec::new())
    }

    pub fn is_no_evidence(&self) -> bool {
        self.answer_text == NO_EVIDENCE_ANSWER && self.cited_document_ids.is_empty()
    }
}

pub const NO_EVIDENCE_ANSWER: &str =
    "No relevant passages were found in the indexed suttas for this question.";

/// Why the search loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    AnalysisComplete,
    AnalysisDegraded,
    DegenerateQuery,
    IterationBudget,
    TimeBudget,
    CorpusExhausted,
}

/// Result of one gap analysis round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapAnalysis {
    /// Evidence is sufficient (or the analyzer could not tell)
    Complete(StopReason),
    /// Search again with a refined query
    Continue { next_query: String },
}

impl GapAnalysis {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn next_query(&self) -> Option<&str> {
        match self {
            Self::Continue { next_query } => Some(next_query),
            Self::Complete(_) => None,
        }
    }
}

/// What `research` hands back to callers
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub answer: SynthesizedAnswer,
    pub iterations_used: usize,
    pub memory_sourced: bool,
    pub passages_consulted: usize,
    /// Similarity of the recalled record, set when `memory_sourced`
    pub recall_similarity: Option<f32>,
    /// Unset when the answer came from memory
    pub stop_reason: Option<StopReason>,
}

impl ResearchOutcome {
    pub fn answer_text(&self) -> &str {
        &self.answer.answer_text
    }

    pub fn citations(&self) -> &[String] {
        &self.answer.cited_document_ids
    }
}

/// Progress notification emitted at every phase transition
#[derive(Debug, Clone, Serialize)]
pub struct ResearchProgress {
    pub phase: ResearchPhase,
    pub message: String,
    pub iteration: usize,
    pub max_iterations: usize,
}

/// Callback receiving progress updates
pub type ProgressCallback = std::sync::Arc<dyn Fn(&ResearchProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(doc: &str) -> Citation {
        Citation {
            document_id: doc.to_string(),
            title: format!("{} title", doc),
            position: "1.1".to_string(),
            snippet: "snippet".to_string(),
            score: 0.7,
        }
    }

    #[test]
    fn test_new_answer_derives_cited_ids_in_order() {
        let answer = SynthesizedAnswer::new("q", "text", vec![citation("mn10"), citation("dn22")]);
        assert_eq!(answer.cited_document_ids, vec!["mn10", "dn22"]);
        assert_eq!(answer.source_question, "q");
    }

    #[test]
    fn test_no_evidence_answer() {
        let answer = SynthesizedAnswer::no_evidence("obscure");
        assert!(answer.is_no_evidence());
        assert!(answer.cited_document_ids.is_empty());
    }

    #[test]
    fn test_answer_json_roundtrip_keeps_timestamp() {
        let answer = SynthesizedAnswer::new("q", "text", vec![citation("sn56.11")]);
        let json = serde_json::to_string(&answer).unwrap();
        let back: SynthesizedAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn test_gap_analysis_accessors() {
        let next = GapAnalysis::Continue {
            next_query: "dependent origination".to_string(),
        };
        assert!(!next.is_complete());
        assert_eq!(next.next_query(), Some("dependent origination"));
        assert!(GapAnalysis::Complete(StopReason::AnalysisComplete).is_complete());
    }
}
