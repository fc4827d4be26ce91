use crate::error::{LocalFixError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::LlmMessage;
use std::sync::Arc;
use tracing::{debug, info};

/// Main interface for LLM interactions
///
/// Binds one model identifier to a gateway so callers only deal in messages.
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    /// Model identifier requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text response from LLM
    pub async fn generate(
        &self,
        messages: &[LlmMessage],
        config: Option<CompletionConfig>,
    ) -> Result<String> {
        let config = config.unwrap_or_default();

        info!(model = %self.model, messages = messages.len(), "Requesting completion");

        let response = self.gateway.complete(&self.model, messages, &config).await?;

        debug!(finish_reason = ?response.finish_reason, "Completion received");

        match response.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(LocalFixError::ProviderError(format!(
                "Model {} returned an empty response",
                self.model
            ))),
        }
    }
}
