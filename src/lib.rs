pub mod advisory;
pub mod config;
pub mod error;
pub mod llm;
pub mod web;

pub use error::{LocalFixError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::advisory::{AdvisoryClient, AdvisoryReply, ImageUpload, Submission};
    pub use crate::config::AppConfig;
    pub use crate::error::{LocalFixError, Result};
    pub use crate::llm::gateways::GeminiGateway;
    pub use crate::llm::{CompletionConfig, LlmBroker, LlmGateway, LlmMessage};
}
