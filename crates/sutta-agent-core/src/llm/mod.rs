//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services (vLLM, Ollama, OpenAI, etc.)
//! - Text completion for gap analysis and answer synthesis

mod client;
mod http_embedder;
mod http_synthesizer;
mod traits;

pub use client::{ChatMessage, LLMClient, MetricsSnapshot, VLLMClient};
pub use http_embedder::HttpEmbedder;
pub use http_synthesizer::HttpSynthesizer;
pub use traits::*;
