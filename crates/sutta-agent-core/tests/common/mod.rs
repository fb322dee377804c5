//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use sutta_agent_core::{
    AgentError, Database, Embedder, MemoryStore, Passage, PassageStore, Result, Synthesizer,
};
use tempfile::TempDir;

/// Passage store over a fixed corpus. Every passage matches every query;
/// results are sorted by score like a real index.
pub struct CorpusStore {
    passages: Vec<Passage>,
    pub calls: AtomicUsize,
    fail: bool,
}

impl CorpusStore {
    pub fn new(passages: Vec<Passage>) -> Self {
        let mut passages = passages;
        passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        Self {
            passages,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PassageStore for CorpusStore {
    async fn query(&self, _text: &str, k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AgentError::ExternalError("index unreachable".to_string()));
        }
        Ok(self.passages.iter().take(k).cloned().collect())
    }

    async fn passage_count(&self) -> Result<Option<usize>> {
        Ok(Some(self.passages.len()))
    }
}

/// Store that produces an unbounded stream of new passages
pub struct EndlessStore {
    pub calls: AtomicUsize,
}

impl EndlessStore {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PassageStore for EndlessStore {
    async fn query(&self, _text: &str, k: usize) -> Result<Vec<Passage>> {
        let round = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..k)
            .map(|i| {
                Passage::new(
                    format!("sn{}", round),
                    format!("{}", i),
                    format!("Discourse {}", round),
                    format!("passage {} of round {}", i, round),
                    0.9 - i as f64 * 0.01,
                )
            })
            .collect())
    }
}

/// Synthesizer scripted per prompt kind.
///
/// Gap analysis prompts (those asking for a `"complete"` JSON field) are
/// answered from `analysis`, falling back to `default_analysis` when the
/// queue is empty. Synthesis prompts get `answer`, or an error if unset.
pub struct ScriptedSynthesizer {
    analysis: Mutex<VecDeque<String>>,
    default_analysis: String,
    answer: Option<String>,
    pub analysis_calls: AtomicUsize,
    pub synthesis_calls: AtomicUsize,
}

impl ScriptedSynthesizer {
    pub fn new(answer: &str) -> Self {
        Self {
            analysis: Mutex::new(VecDeque::new()),
            default_analysis: r#"{"complete": true, "next_query": null, "reasoning": "enough"}"#
                .to_string(),
            answer: Some(answer.to_string()),
            analysis_calls: AtomicUsize::new(0),
            synthesis_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_analysis(mut self, responses: &[&str]) -> Self {
        self.analysis = Mutex::new(responses.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_default_analysis(mut self, response: &str) -> Self {
        self.default_analysis = response.to_string();
        self
    }

    /// Analysis works but synthesis always fails
    pub fn failing_synthesis() -> Self {
        Self {
            answer: None,
            ..Self::new("")
        }
    }

    pub fn analysis_calls(&self) -> usize {
        self.analysis_calls.load(Ordering::SeqCst)
    }

    pub fn synthesis_calls(&self) -> usize {
        self.synthesis_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for ScriptedSynthesizer {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("\"complete\"") {
            self.analysis_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.analysis.lock().unwrap().pop_front();
            return Ok(next.unwrap_or_else(|| self.default_analysis.clone()));
        }

        self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Some(answer) => Ok(answer.clone()),
            None => Err(AgentError::Llm("model overloaded".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Synthesizer that answers analysis prompts with an error
pub struct BrokenAnalysisSynthesizer {
    pub analysis_calls: AtomicUsize,
}

#[async_trait]
impl Synthesizer for BrokenAnalysisSynthesizer {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.contains("\"complete\"") {
            self.analysis_calls.fetch_add(1, Ordering::SeqCst);
            return Err(AgentError::Llm("connection reset".to_string()));
        }
        Ok("Answer citing [sn0].".to_string())
    }

    fn model_name(&self) -> &str {
        "broken-analysis"
    }
}

/// Bag-of-words embedding over a small fixed vocabulary
pub struct VocabEmbedder;

const VOCAB: &[&str] = &[
    "dukkha", "suffering", "metta", "kindness", "jhana", "breath", "kamma", "rebirth", "nibbana",
    "anatta", "self",
];

#[async_trait]
impl Embedder for VocabEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut v: Vec<f32> = VOCAB
            .iter()
            .map(|w| if lower.contains(w) { 1.0 } else { 0.0 })
            .collect();
        v.push(0.01);
        Ok(v)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        VOCAB.len() + 1
    }

    fn model_name(&self) -> &str {
        "vocab"
    }
}

/// Embeds successfully once per `ok_budget`, then fails
pub struct FlakyEmbedder {
    ok_budget: AtomicUsize,
}

impl FlakyEmbedder {
    pub fn failing() -> Self {
        Self {
            ok_budget: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for FlakyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let left = self.ok_budget.load(Ordering::SeqCst);
        if left == 0 {
            return Err(AgentError::ExternalError("embedding service down".to_string()));
        }
        self.ok_budget.store(left - 1, Ordering::SeqCst);
        VocabEmbedder.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for t in texts {
            out.push(self.embed(t).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        VOCAB.len() + 1
    }

    fn model_name(&self) -> &str {
        "flaky"
    }
}

/// File-backed memory store inside `dir`
pub fn memory_in(dir: &TempDir, embedder: Arc<dyn Embedder>) -> Arc<MemoryStore> {
    let db = Database::open(dir.path().join("memory.sqlite")).unwrap();
    db.initialize().unwrap();
    Arc::new(MemoryStore::new(db, embedder, 0.92))
}

pub fn sample_corpus() -> Vec<Passage> {
    vec![
        Passage::new(
            "sn56.11",
            "sn56.11:5.1",
            "Setting in Motion the Wheel of Dhamma",
            "Birth is suffering, aging is suffering, death is suffering.",
            0.91,
        ),
        Passage::new(
            "sn56.11",
            "sn56.11:6.1",
            "Setting in Motion the Wheel of Dhamma",
            "The origin of suffering is craving.",
            0.84,
        ),
        Passage::new(
            "mn141",
            "mn141:10.1",
            "The Analysis of the Truths",
            "What is the noble truth of suffering?",
            0.77,
        ),
        Passage::new(
            "dn22",
            "dn22:18.1",
            "The Longer Discourse on Mindfulness Meditation",
            "And what is the noble truth of suffering?",
            0.63,
        ),
    ]
}
