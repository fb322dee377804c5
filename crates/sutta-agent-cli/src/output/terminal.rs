//! Terminal output formatter

use sutta_agent_core::{AgentStatus, ExhaustiveResults, ResearchOutcome};

pub fn format_outcome(outcome: &ResearchOutcome) -> String {
    let mut output = String::new();
    output.push_str(outcome.answer_text().trim());
    output.push('\n');

    if !outcome.answer.citations.is_empty() {
        output.push_str("\nSources:\n");
        for citation in &outcome.answer.citations {
            output.push_str(&format!(
                "  [{}] {} ({})\n",
                citation.document_id, citation.title, citation.position
            ));
        }
    }

    output.push('\n');
    if outcome.memory_sourced {
        let similarity = outcome.recall_similarity.unwrap_or(1.0);
        output.push_str(&format!(
            "Recalled from memory (similarity {:.0}%)\n",
            similarity * 100.0
        ));
    } else {
        output.push_str(&format!(
            "{} search round(s), {} passages consulted\n",
            outcome.iterations_used, outcome.passages_consulted
        ));
    }

    output
}

pub fn format_search_results(results: &ExhaustiveResults) -> String {
    if results.groups.is_empty() {
        return format!("No documents found for \"{}\"\n", results.query);
    }

    let mut output = format!(
        "{} documents ({} passages) for \"{}\"\n\n",
        results.document_count, results.total_passages, results.query
    );

    for group in &results.groups {
        let score_pct = (group.score * 100.0) as u32;
        output.push_str(&format!(
            "{:>3}% {} {} ({} match{})\n",
            score_pct,
            group.document_id,
            group.title,
            group.match_count,
            if group.match_count == 1 { "" } else { "es" }
        ));
        output.push_str(&format!("     {}\n", group.snippet.replace('\n', " ")));
    }

    output
}

pub fn format_status(status: &AgentStatus) -> String {
    let passages = status
        .passage_count
        .map_or_else(|| "unknown".to_string(), |n| n.to_string());
    format!(
        "Passages:        {}\nMemory records:  {}\nMemory enabled:  {}\nModel:           {}\nReady:           {}\n",
        passages,
        status.memory_count,
        if status.memory_enabled { "yes" } else { "no" },
        status.model,
        if status.ready { "yes" } else { "no (index is empty)" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sutta_agent_core::search::group_by_document;
    use sutta_agent_core::Passage;

    #[test]
    fn test_search_results_listing() {
        let groups = group_by_document(
            vec![
                Passage::new("mn10", "1", "Mindfulness Meditation", "the four kinds", 0.75),
                Passage::new("mn10", "2", "Mindfulness Meditation", "a mendicant", 0.4),
            ],
            "mindfulness",
        );
        let results = ExhaustiveResults {
            query: "mindfulness".to_string(),
            total_passages: 2,
            document_count: groups.len(),
            groups,
        };

        let text = format_search_results(&results);
        assert!(text.contains(" 75% mn10 Mindfulness Meditation (2 matches)"));
        assert!(text.contains("the four kinds"));
    }

    #[test]
    fn test_status_listing() {
        let status = AgentStatus {
            passage_count: Some(0),
            memory_count: 3,
            memory_enabled: true,
            model: "llama3.1:8b".to_string(),
            ready: false,
        };
        let text = format_status(&status);
        assert!(text.contains("Memory records:  3"));
        assert!(text.contains("no (index is empty)"));
    }
}
