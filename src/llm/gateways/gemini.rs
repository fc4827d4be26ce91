//! Google Gemini gateway for LLM interactions.
//!
//! Sends multimodal prompts to the `generateContent` endpoint of the Gemini REST API
//! and returns the concatenated text of the first candidate.

use crate::config::{AppConfig, DEFAULT_BASE_URL};
use crate::error::{LocalFixError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::{ContentPart, LlmGatewayResponse, LlmMessage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Configuration for connecting to the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl From<&AppConfig> for GeminiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout: Some(config.timeout),
        }
    }
}

/// Gateway for the hosted Gemini multimodal models.
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Create a new Gemini gateway with custom configuration.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LocalFixError::ConfigError("Gemini API key is empty".to_string()));
        }

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(GeminiConfig {
            base_url: base_url.into(),
            ..GeminiConfig::new(api_key)
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: Option<String>,
}

fn adapt_messages_to_gemini(messages: &[LlmMessage]) -> Vec<GeminiContent<'_>> {
    messages
        .iter()
        .map(|msg| GeminiContent {
            role: "user",
            parts: msg
                .parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => GeminiPart::Text { text },
                    ContentPart::Image { media_type, data } => GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: media_type,
                            data,
                        },
                    },
                })
                .collect(),
        })
        .collect()
}

fn map_transport_error(err: reqwest::Error) -> LocalFixError {
    if err.is_timeout() {
        LocalFixError::TimeoutError(format!("Gemini request timed out: {}", err))
    } else if err.is_connect() {
        LocalFixError::ProviderError(format!("Could not connect to Gemini: {}", err))
    } else {
        LocalFixError::HttpError(err)
    }
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("Authentication rejected by Gemini ({}): {}", status, detail)
        }
        _ if detail.contains("API key") => {
            format!("Authentication rejected by Gemini ({}): {}", status, detail)
        }
        _ => format!("Gemini API error ({}): {}", status, detail),
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn complete(
        &self,
        model: &str,
        messages: &[LlmMessage],
        config: &CompletionConfig,
    ) -> Result<LlmGatewayResponse> {
        info!("Delegating to Gemini for completion");
        debug!(model = model, messages = messages.len(), "Building generateContent request");

        let body = GenerateContentRequest {
            contents: adapt_messages_to_gemini(messages),
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message = describe_failure(status, &text);
            error!(status = %status, "Gemini request failed");
            return Err(LocalFixError::ProviderError(message));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            LocalFixError::ProviderError(format!("Malformed Gemini response body: {}", e))
        })?;

        let candidate = match parsed.candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!("prompt blocked ({})", r))
                    .unwrap_or_else(|| "no candidates returned".to_string());
                return Err(LocalFixError::ProviderError(format!("Gemini returned {}", reason)));
            }
        };

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LocalFixError::ProviderError(format!(
                "Gemini returned a candidate without text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(LlmGatewayResponse {
            content: Some(content),
            finish_reason: candidate.finish_reason,
        })
    }
}
