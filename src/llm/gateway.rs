use crate::config::DEFAULT_TEMPERATURE;
use crate::error::Result;
use crate::llm::models::{LlmGatewayResponse, LlmMessage};
use async_trait::async_trait;

/// Configuration for LLM completion
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

/// Abstract interface for LLM providers
///
/// LocalFix ships a single hosted implementation; anything else that can answer a
/// multimodal prompt with text can be slotted in behind this trait.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete an LLM request with text response
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse>;
}

