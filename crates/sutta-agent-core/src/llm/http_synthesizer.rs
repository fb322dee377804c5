//! Synthesizer backed by a chat-completion LLM service

use super::{ChatMessage, LLMClient, Synthesizer};
use crate::config::LLMServiceConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a careful scholar of the Pali Canon. \
Answer only from the passages you are given, cite sources exactly as instructed, \
and follow the requested output format.";

/// Synthesizer that forwards prompts to an external chat model
pub struct HttpSynthesizer {
    client: Arc<dyn LLMClient>,
}

impl HttpSynthesizer {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let client = super::VLLMClient::new(config)?;
        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        let response = self.client.chat_completion(messages).await?;
        if response.trim().is_empty() {
            return Err(AgentError::Llm("Empty completion".to_string()));
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        self.client.model_name()
    }
}
