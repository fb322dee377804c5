//! Final answer synthesis from accumulated evidence

use super::citations::{document_ids, extract_cited_ids};
use super::digest::{build_digest, DigestLimits};
use super::types::{Citation, SynthesizedAnswer};
use crate::error::{AgentError, ResearchPhase, Result};
use crate::llm::Synthesizer;
use crate::search::{extract_snippet, Passage};
use std::sync::Arc;
use std::time::Duration;

const CITATION_SNIPPET_LENGTH: usize = 300;

const SYNTHESIS_PROMPT: &str = r#"Answer the question using ONLY the passages below.
Cite every claim with the document id in square brackets exactly as shown in the passage headers, e.g. [mn10].
If the passages do not settle the question, say so plainly.
Write in clear prose without repeating the passages verbatim."#;

/// Produces a cited answer from session evidence
pub struct AnswerSynthesizer {
    synthesizer: Arc<dyn Synthesizer>,
    timeout: Duration,
    limits: DigestLimits,
}

impl AnswerSynthesizer {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, timeout: Duration, limits: DigestLimits) -> Self {
        Self {
            synthesizer,
            timeout,
            limits,
        }
    }

    /// Synthesize an answer to `question` from `passages`.
    ///
    /// With no passages an explicit no-evidence answer is returned without
    /// calling the model.
    pub async fn synthesize(&self, question: &str, passages: &[Passage]) -> Result<SynthesizedAnswer> {
        if passages.is_empty() {
            tracing::info!("No evidence found for {:?}", question);
            return Ok(SynthesizedAnswer::no_evidence(question));
        }

        let prompt = format!(
            "{}\n\nQuestion: {}\n\nPassages:\n{}",
            SYNTHESIS_PROMPT,
            question,
            build_digest(passages, self.limits)
        );

        let text = match tokio::time::timeout(self.timeout, self.synthesizer.complete(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(failed(question, e.to_string())),
            Err(_) => {
                return Err(failed(
                    question,
                    format!("synthesis timed out after {:?}", self.timeout),
                ))
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(failed(question, "synthesizer returned empty text".to_string()));
        }

        let cited = extract_cited_ids(text, document_ids(passages));
        let citations = cited
            .iter()
            .filter_map(|doc| best_citation(doc, passages, question))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Synthesized {} chars citing {} of {} documents",
            text.len(),
            citations.len(),
            document_ids(passages).len()
        );

        Ok(SynthesizedAnswer::new(question, text, citations))
    }
}

fn failed(question: &str, reason: String) -> AgentError {
    AgentError::SynthesisFailed {
        question: question.to_string(),
        phase: ResearchPhase::Synthesize,
        reason,
    }
}

/// Citation detail from the highest-scoring passage of `document_id`
fn best_citation(document_id: &str, passages: &[Passage], question: &str) -> Option<Citation> {
    let best = passages
        .iter()
        .filter(|p| p.document_id == document_id)
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))?;

    Some(Citation {
        document_id: best.document_id.clone(),
        title: best.title().to_string(),
        position: best.position().to_string(),
        snippet: extract_snippet(&best.text, question, Some(CITATION_SNIPPET_LENGTH)).snippet,
        score: best.score,
    })
}
