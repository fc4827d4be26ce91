/// One piece of multimodal message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text {
        text: String,
    },
    /// Inline image; `data` is already base64-encoded
    Image {
        media_type: String,
        data: String,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::Image {
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// A single-turn user message; parts are sent in order
#[derive(Debug, Clone, PartialEq)]
pub struct LlmMessage {
    pub parts: Vec<ContentPart>,
}

/// Response from an LLM gateway
#[derive(Debug, Clone)]
pub struct LlmGatewayResponse {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

impl LlmMessage {
    /// Create a user message from prepared parts
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self { parts }
    }
}
