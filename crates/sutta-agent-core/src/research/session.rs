//! Per-question research state

use crate::search::Passage;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Mutable state of one research question.
///
/// Owned by a single orchestrator invocation and never shared, so it
/// needs no synchronization.
#[derive(Debug)]
pub struct ResearchSession {
    original_question: String,
    current_query: String,
    passages: Vec<Passage>,
    seen: HashSet<String>,
    iteration: usize,
    max_iterations: usize,
    started: Instant,
}

impl ResearchSession {
    pub fn new(question: impl Into<String>, max_iterations: usize) -> Self {
        let question = question.into();
        Self {
            current_query: question.clone(),
            original_question: question,
            passages: Vec::new(),
            seen: HashSet::new(),
            iteration: 0,
            max_iterations,
            started: Instant::now(),
        }
    }

    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    pub fn current_query(&self) -> &str {
        &self.current_query
    }

    pub fn set_current_query(&mut self, query: impl Into<String>) {
        self.current_query = query.into();
    }

    /// Accumulated passages in discovery order
    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn seen_mut(&mut self) -> &mut HashSet<String> {
        &mut self.seen
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Start a new retrieval round, returning its 1-based number
    pub fn begin_iteration(&mut self) -> usize {
        self.iteration += 1;
        self.iteration
    }

    pub fn iterations_exhausted(&self) -> bool {
        self.iteration >= self.max_iterations
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Append a retrieved batch. Passages already accumulated are skipped
    /// so ids stay unique even if a store misbehaves.
    pub fn accumulate(&mut self, batch: Vec<Passage>) -> usize {
        let mut added = 0;
        for passage in batch {
            if self.passages.iter().any(|p| p.id == passage.id) {
                continue;
            }
            self.seen.insert(passage.id.clone());
            self.passages.push(passage);
            added += 1;
        }
        added
    }
}
