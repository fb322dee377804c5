//! Iterative research over the passage index
//!
//! Provides:
//! - Deduplicating retrieval across the rounds of one question
//! - LLM gap analysis that refines the search query
//! - Cited answer synthesis with bounded evidence digests
//! - The orchestrator tying these to memory recall and learning

mod citations;
mod digest;
mod gap;
mod orchestrator;
mod retriever;
mod session;
mod synthesis;
mod types;

pub use citations::{document_ids, extract_cited_ids};
pub use digest::{build_digest, DigestLimits};
pub use gap::GapAnalyzer;
pub use orchestrator::ResearchOrchestrator;
pub use retriever::DeduplicatingRetriever;
pub use session::ResearchSession;
pub use synthesis::AnswerSynthesizer;
pub use types::*;
