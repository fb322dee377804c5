//! Gap analysis: does the evidence answer the question, and if not, what
//! should be searched next?

use super::digest::{build_digest, DigestLimits};
use super::types::{GapAnalysis, StopReason};
use crate::error::AgentError;
use crate::llm::Synthesizer;
use crate::search::Passage;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const ANALYSIS_PROMPT: &str = r#"You are helping research a question about the Pali Canon.
Decide whether the passages below contain enough evidence to answer the question fully.
If they do not, propose ONE new search query that would find the missing evidence.
The new query must differ from the current query.

Respond with a JSON object only:
{"complete": true|false, "next_query": "<query or null>", "reasoning": "<one sentence>"}"#;

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    complete: bool,
    #[serde(default)]
    next_query: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Judges completeness of accumulated evidence.
///
/// Never fails: when the model is unreachable or its answer cannot be
/// parsed, the analysis reports `Complete(AnalysisDegraded)` so research
/// proceeds to synthesis with what it has.
pub struct GapAnalyzer {
    synthesizer: Arc<dyn Synthesizer>,
    timeout: Duration,
    limits: DigestLimits,
}

impl GapAnalyzer {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, timeout: Duration, limits: DigestLimits) -> Self {
        Self {
            synthesizer,
            timeout,
            limits,
        }
    }

    pub async fn analyze(
        &self,
        original_question: &str,
        passages: &[Passage],
        current_query: &str,
    ) -> GapAnalysis {
        let prompt = build_prompt(original_question, passages, current_query, self.limits);

        let response = match tokio::time::timeout(self.timeout, self.synthesizer.complete(&prompt))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return degraded(original_question, e.to_string()),
            Err(_) => {
                return degraded(
                    original_question,
                    format!("analysis timed out after {:?}", self.timeout),
                )
            }
        };

        match parse_analysis_response(&response) {
            Some(parsed) => interpret(parsed, current_query),
            None => degraded(original_question, "unparseable analysis response".to_string()),
        }
    }
}

fn degraded(question: &str, reason: String) -> GapAnalysis {
    let err = AgentError::AnalysisDegraded(reason);
    tracing::warn!("Gap analysis for {:?}: {}", question, err);
    GapAnalysis::Complete(StopReason::AnalysisDegraded)
}

fn build_prompt(
    original_question: &str,
    passages: &[Passage],
    current_query: &str,
    limits: DigestLimits,
) -> String {
    format!(
        "{}\n\nQuestion: {}\nCurrent search query: {}\n\nPassages found so far ({}):\n{}",
        ANALYSIS_PROMPT,
        original_question,
        current_query,
        passages.len(),
        build_digest(passages, limits)
    )
}

fn interpret(parsed: AnalysisResponse, current_query: &str) -> GapAnalysis {
    if let Some(reasoning) = parsed.reasoning.as_deref() {
        tracing::debug!("Gap analysis reasoning: {}", reasoning);
    }

    // "complete" wins even when a next query is also present
    if parsed.complete {
        return GapAnalysis::Complete(StopReason::AnalysisComplete);
    }

    match parsed.next_query {
        Some(next) if !next.trim().is_empty() && !same_query(&next, current_query) => {
            GapAnalysis::Continue {
                next_query: next.trim().to_string(),
            }
        }
        _ => {
            tracing::debug!("Gap analysis proposed no usable follow-up query");
            GapAnalysis::Complete(StopReason::DegenerateQuery)
        }
    }
}

fn same_query(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    };
    norm(a) == norm(b)
}

/// Pull the JSON object out of a completion that may wrap it in prose or
/// code fences
fn parse_analysis_response(response: &str) -> Option<AnalysisResponse> {
    let trimmed = response.trim();
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str(&trimmed[start..=end]) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Failed to parse gap analysis JSON: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;

    struct Canned(String);

    #[async_trait]
    impl Synthesizer for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct Down;

    #[async_trait]
    impl Synthesizer for Down {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(AgentError::Llm("connection refused".to_string()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn analyzer(synth: impl Synthesizer + 'static) -> GapAnalyzer {
        GapAnalyzer::new(Arc::new(synth), Duration::from_secs(5), DigestLimits::default())
    }

    async fn run(response: &str, current: &str) -> GapAnalysis {
        analyzer(Canned(response.to_string()))
            .analyze("what is dukkha?", &[], current)
            .await
    }

    #[tokio::test]
    async fn test_continue_with_new_query() {
        let result = run(
            r#"{"complete": false, "next_query": "three marks of existence", "reasoning": "need more"}"#,
            "what is dukkha?",
        )
        .await;
        assert_eq!(result.next_query(), Some("three marks of existence"));
    }

    #[tokio::test]
    async fn test_complete_is_authoritative() {
        let result = run(
            r#"{"complete": true, "next_query": "something else", "reasoning": "enough"}"#,
            "q",
        )
        .await;
        assert_eq!(result, GapAnalysis::Complete(StopReason::AnalysisComplete));
    }

    #[tokio::test]
    async fn test_json_inside_fences_and_prose() {
        let result = run(
            "Here is my judgment:\n```json\n{\"complete\": false, \"next_query\": \"anatta\"}\n```",
            "q",
        )
        .await;
        assert_eq!(result.next_query(), Some("anatta"));
    }

    #[tokio::test]
    async fn test_degenerate_queries_complete() {
        for response in [
            r#"{"complete": false, "next_query": null}"#,
            r#"{"complete": false, "next_query": "   "}"#,
            r#"{"complete": false, "next_query": "  What IS   dukkha? "}"#,
        ] {
            assert_eq!(
                run(response, "what is dukkha?").await,
                GapAnalysis::Complete(StopReason::DegenerateQuery),
                "response: {}",
                response
            );
        }
    }

    #[tokio::test]
    async fn test_unparseable_fails_open() {
        assert_eq!(
            run("I think we need more passages.", "q").await,
            GapAnalysis::Complete(StopReason::AnalysisDegraded)
        );
    }

    #[tokio::test]
    async fn test_synthesizer_error_fails_open() {
        let result = analyzer(Down).analyze("q", &[], "q").await;
        assert_eq!(result, GapAnalysis::Complete(StopReason::AnalysisDegraded));
    }

    #[test]
    fn test_prompt_contains_question_and_digest() {
        let passages = vec![Passage::new("sn56.11", "1", "Setting the Wheel", "birth is dukkha", 0.9)];
        let prompt = build_prompt("what is dukkha?", &passages, "dukkha", DigestLimits::default());
        assert!(prompt.contains("Question: what is dukkha?"));
        assert!(prompt.contains("Current search query: dukkha"));
        assert!(prompt.contains("[sn56.11]"));
    }
}
