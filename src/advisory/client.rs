//! The advisory round trip: submission in, rendered advice out.

use crate::advisory::payload::PromptPayload;
use crate::advisory::render;
use crate::advisory::reply::{AdvisoryFields, AdvisoryReply};
use crate::advisory::submission::Submission;
use crate::config::AppConfig;
use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::{GeminiConfig, GeminiGateway};
use crate::llm::LlmBroker;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Lifecycle of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Collecting,
    Validating,
    Invoking,
    Rendering,
    Displayed,
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Collecting => "collecting",
            SubmissionState::Validating => "validating",
            SubmissionState::Invoking => "invoking",
            SubmissionState::Rendering => "rendering",
            SubmissionState::Displayed => "displayed",
            SubmissionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything the display needs from a successful round trip
#[derive(Debug, Clone)]
pub struct Advice {
    pub reply: AdvisoryReply,
    pub rendered: String,
    pub fields: AdvisoryFields,
}

/// Turns submissions into prompts, asks the model, and formats the answer.
///
/// One instance is shared by all requests; it holds no per-submission state.
pub struct AdvisoryClient {
    broker: LlmBroker,
    completion: CompletionConfig,
    wrap_width: usize,
    legacy_png_media_type: bool,
}

impl AdvisoryClient {
    /// Create a client over an arbitrary gateway.
    pub fn new(gateway: Arc<dyn LlmGateway>, config: &AppConfig) -> Self {
        Self {
            broker: LlmBroker::new(config.model.clone(), gateway),
            completion: CompletionConfig {
                temperature: config.temperature,
                max_tokens: config.max_output_tokens,
            },
            wrap_width: config.wrap_width,
            legacy_png_media_type: config.legacy_png_media_type,
        }
    }

    /// Create a client talking to Gemini with the given configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let gateway = GeminiGateway::with_config(GeminiConfig::from(config))?;
        Ok(Self::new(Arc::new(gateway), config))
    }

    pub fn build_payload(&self, submission: &Submission) -> PromptPayload {
        PromptPayload::build(submission, self.legacy_png_media_type)
    }

    /// Send the payload to the model. Failures are terminal; nothing is retried.
    pub async fn invoke(&self, payload: &PromptPayload) -> Result<AdvisoryReply> {
        let message = payload.to_message();
        let text = self.broker.generate(&[message], Some(self.completion.clone())).await?;
        Ok(AdvisoryReply::new(text))
    }

    pub fn render(&self, reply: &AdvisoryReply) -> String {
        render::render(reply, self.wrap_width)
    }

    /// Run one submission through validation, inference and rendering.
    pub async fn advise(&self, submission: &Submission) -> Result<Advice> {
        debug!(state = %SubmissionState::Validating, "Submission received");
        if let Err(e) = submission.validate() {
            warn!(state = %SubmissionState::Idle, "Empty submission, nothing sent");
            return Err(e);
        }

        let payload = self.build_payload(submission);
        info!(
            state = %SubmissionState::Invoking,
            model = %self.broker.model(),
            has_text = submission.has_text(),
            has_image = payload.has_image(),
            segments = payload.segments().len(),
            "Requesting advice"
        );

        let started = Instant::now();
        let reply = match self.invoke(&payload).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    state = %SubmissionState::Failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Advice request failed"
                );
                return Err(e);
            }
        };

        debug!(state = %SubmissionState::Rendering, chars = reply.raw_text().len(), "Reply received");
        let rendered = self.render(&reply);
        let fields = reply.fields();

        info!(
            state = %SubmissionState::Displayed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            structured = !fields.is_empty(),
            "Advice ready"
        );

        Ok(Advice {
            reply,
            rendered,
            fields,
        })
    }
}
