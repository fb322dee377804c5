//! JSON output formatter

use serde::Serialize;
use sutta_agent_core::{ExhaustiveResults, ResearchOutcome};

pub fn to_pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_outcome(outcome: &ResearchOutcome) -> String {
    let output = serde_json::json!({
        "question": outcome.answer.source_question,
        "answer": outcome.answer_text(),
        "citations": outcome.answer.citations,
        "cited_document_ids": outcome.citations(),
        "from_memory": outcome.memory_sourced,
        "recall_similarity": outcome.recall_similarity,
        "iterations": outcome.iterations_used,
        "passages_consulted": outcome.passages_consulted,
        "stop_reason": outcome.stop_reason,
        "created_at": outcome.answer.created_at,
    });
    to_pretty(&output)
}

pub fn format_search_results(results: &ExhaustiveResults) -> String {
    to_pretty(results)
}
