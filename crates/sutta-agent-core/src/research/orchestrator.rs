//! Iterative research loop
//!
//! Drives one question through
//! `Recall -> Searching <-> Analyzing -> Synthesizing -> Learning -> Done`.
//! Retrieval and synthesis failures abort the question; analysis and
//! memory failures only degrade it.

use super::digest::DigestLimits;
use super::gap::GapAnalyzer;
use super::retriever::DeduplicatingRetriever;
use super::session::ResearchSession;
use super::synthesis::AnswerSynthesizer;
use super::types::{
    GapAnalysis, ProgressCallback, ResearchOutcome, ResearchProgress, StopReason,
    SynthesizedAnswer,
};
use crate::config::ResearchConfig;
use crate::error::{AgentError, ResearchPhase, Result};
use crate::llm::Synthesizer;
use crate::memory::MemoryStore;
use crate::search::{PassageStore, Query};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Loop states. Each variant carries what the next step needs.
#[derive(Debug)]
enum State {
    Recall,
    Searching,
    Analyzing,
    Synthesizing(StopReason),
    Learning(SynthesizedAnswer, StopReason),
    Done(ResearchOutcome),
}

/// Runs research sessions against injected services.
///
/// Holds no per-question state, so one orchestrator can serve concurrent
/// questions; only the memory store is shared between them.
pub struct ResearchOrchestrator {
    retriever: DeduplicatingRetriever,
    analyzer: GapAnalyzer,
    synthesizer: AnswerSynthesizer,
    memory: Option<Arc<MemoryStore>>,
    config: ResearchConfig,
    progress: Option<ProgressCallback>,
}

impl ResearchOrchestrator {
    pub fn new(
        store: Arc<dyn PassageStore>,
        synthesizer: Arc<dyn Synthesizer>,
        memory: Option<Arc<MemoryStore>>,
        config: ResearchConfig,
    ) -> Self {
        let timeout = config.per_call_timeout();
        let limits = DigestLimits {
            char_budget: config.digest_char_budget,
            passage_char_limit: config.passage_char_limit,
        };

        Self {
            retriever: DeduplicatingRetriever::new(store, config.over_fetch_factor, timeout),
            analyzer: GapAnalyzer::new(synthesizer.clone(), timeout, limits),
            synthesizer: AnswerSynthesizer::new(synthesizer, timeout, limits),
            memory: if config.memory_enabled { memory } else { None },
            config,
            progress: None,
        }
    }

    /// Receive a notification at every phase transition
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    fn timeout(&self) -> Duration {
        self.config.per_call_timeout()
    }

    /// Answer `question`, consulting memory first
    pub async fn research(&self, question: &str) -> Result<ResearchOutcome> {
        self.research_with_cancel(question, &CancellationToken::new())
            .await
    }

    /// Like [`research`](Self::research), aborting at the next state
    /// transition once `cancel` fires
    pub async fn research_with_cancel(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<ResearchOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }

        tracing::info!("Researching {:?}", question);
        let mut session = ResearchSession::new(question, self.config.max_iterations);
        let mut state = State::Recall;

        loop {
            state = match state {
                State::Recall => self.recall(&session, cancel).await?,
                State::Searching => self.search(&mut session, cancel).await?,
                State::Analyzing => self.analyze(&mut session, cancel).await?,
                State::Synthesizing(reason) => self.synthesize(&session, reason, cancel).await?,
                State::Learning(answer, reason) => self.learn(&session, answer, reason).await,
                State::Done(outcome) => {
                    self.report(&session, ResearchPhase::Complete, "Complete");
                    tracing::info!(
                        "Research for {:?} done: {} iterations, {} passages, memory={}, stop={:?}",
                        question,
                        outcome.iterations_used,
                        outcome.passages_consulted,
                        outcome.memory_sourced,
                        outcome.stop_reason
                    );
                    return Ok(outcome);
                }
            };
        }
    }

    async fn recall(&self, session: &ResearchSession, cancel: &CancellationToken) -> Result<State> {
        let Some(memory) = &self.memory else {
            return Ok(State::Searching);
        };
        check_cancelled(session, ResearchPhase::Recall, cancel)?;
        self.report(session, ResearchPhase::Recall, "Checking memory");

        let question = session.original_question();
        let recalled = match tokio::time::timeout(self.timeout(), memory.recall(question)).await {
            Ok(Ok(recalled)) => recalled,
            Ok(Err(e)) => {
                tracing::warn!("Memory recall failed for {:?}, treating as miss: {}", question, e);
                None
            }
            Err(_) => {
                tracing::warn!("Memory recall timed out for {:?}, treating as miss", question);
                None
            }
        };

        Ok(match recalled {
            Some(hit) => State::Done(ResearchOutcome {
                answer: hit.answer,
                iterations_used: 0,
                memory_sourced: true,
                passages_consulted: 0,
                recall_similarity: Some(hit.similarity),
                stop_reason: None,
            }),
            None => State::Searching,
        })
    }

    async fn search(&self, session: &mut ResearchSession, cancel: &CancellationToken) -> Result<State> {
        check_cancelled(session, ResearchPhase::Search, cancel)?;
        let iteration = session.begin_iteration();
        self.report(
            session,
            ResearchPhase::Search,
            &format!("Searching: {}", session.current_query()),
        );

        let query = Query::new(session.current_query());
        let retrieved = self
            .retriever
            .retrieve(&query, self.config.retrieval_batch_size, session.seen_mut())
            .await;
        let batch = retrieved.map_err(|e| e.for_question(session.original_question()))?;

        if batch.is_empty() {
            tracing::debug!("Round {}: corpus exhausted", iteration);
            return Ok(State::Synthesizing(StopReason::CorpusExhausted));
        }

        let added = session.accumulate(batch);
        tracing::debug!(
            "Round {}: {} new passages ({} total)",
            iteration,
            added,
            session.passages().len()
        );

        if session.iterations_exhausted() {
            return Ok(State::Synthesizing(StopReason::IterationBudget));
        }
        if let Some(budget) = self.config.time_budget() {
            if session.elapsed() >= budget {
                return Ok(State::Synthesizing(StopReason::TimeBudget));
            }
        }
        Ok(State::Analyzing)
    }

    async fn analyze(&self, session: &mut ResearchSession, cancel: &CancellationToken) -> Result<State> {
        check_cancelled(session, ResearchPhase::Analyze, cancel)?;
        self.report(
            session,
            ResearchPhase::Analyze,
            &format!("Analyzing {} passages", session.passages().len()),
        );

        let analysis = self
            .analyzer
            .analyze(
                session.original_question(),
                session.passages(),
                session.current_query(),
            )
            .await;

        Ok(match analysis {
            GapAnalysis::Complete(reason) => State::Synthesizing(reason),
            GapAnalysis::Continue { next_query } => {
                tracing::debug!("Refining query to {:?}", next_query);
                session.set_current_query(next_query);
                State::Searching
            }
        })
    }

    async fn synthesize(
        &self,
        session: &ResearchSession,
        reason: StopReason,
        cancel: &CancellationToken,
    ) -> Result<State> {
        check_cancelled(session, ResearchPhase::Synthesize, cancel)?;
        self.report(session, ResearchPhase::Synthesize, "Synthesizing answer");

        let answer = self
            .synthesizer
            .synthesize(session.original_question(), session.passages())
            .await
            .map_err(|e| e.for_question(session.original_question()))?;

        Ok(State::Learning(answer, reason))
    }

    /// Save the answer to memory. Never fails the question.
    async fn learn(
        &self,
        session: &ResearchSession,
        answer: SynthesizedAnswer,
        reason: StopReason,
    ) -> State {
        if let Some(memory) = &self.memory {
            if answer.is_no_evidence() {
                tracing::debug!("Not saving no-evidence answer to memory");
            } else {
                self.report(session, ResearchPhase::Learn, "Saving to memory");
                let question = session.original_question();
                match tokio::time::timeout(self.timeout(), memory.save(question, &answer)).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::warn!("Answer for {:?} not saved: {}", question, e),
                    Err(_) => tracing::warn!(
                        "Answer for {:?} not saved: {}",
                        question,
                        AgentError::MemoryWriteFailed("save timed out".to_string())
                    ),
                }
            }
        }

        State::Done(ResearchOutcome {
            answer,
            iterations_used: session.iteration(),
            memory_sourced: false,
            passages_consulted: session.passages().len(),
            recall_similarity: None,
            stop_reason: Some(reason),
        })
    }

    fn report(&self, session: &ResearchSession, phase: ResearchPhase, message: &str) {
        if let Some(callback) = &self.progress {
            callback(&ResearchProgress {
                phase,
                message: message.to_string(),
                iteration: session.iteration(),
                max_iterations: session.max_iterations(),
            });
        }
    }
}

fn check_cancelled(
    session: &ResearchSession,
    phase: ResearchPhase,
    cancel: &CancellationToken,
) -> Result<()> {
    if cancel.is_cancelled() {
        tracing::info!("Research for {:?} cancelled before {}", session.original_question(), phase);
        return Err(AgentError::Cancelled {
            question: session.original_question().to_string(),
            phase,
        });
    }
    Ok(())
}
