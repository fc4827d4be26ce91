//! Error types and result aliases for LocalFix.
//!
//! This module defines the core error type [`LocalFixError`] and the [`Result`] type alias
//! used throughout the crate. Every fallible operation, from reading an upload to calling
//! the provider, returns `Result<T>` so the web layer can map failures in one place.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalFixError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Image encoding error: {0}")]
    EncodingError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LocalFixError {
    /// True for every failure that happened talking to the inference provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            LocalFixError::ProviderError(_)
                | LocalFixError::TimeoutError(_)
                | LocalFixError::HttpError(_)
                | LocalFixError::SerializationError(_)
        )
    }

    /// Short machine-readable category name
    pub fn kind(&self) -> &'static str {
        match self {
            LocalFixError::ValidationError(_) => "validation",
            LocalFixError::ConfigError(_) => "configuration",
            LocalFixError::EncodingError(_) | LocalFixError::IoError(_) => "encoding",
            _ => "provider",
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalFixError>;
