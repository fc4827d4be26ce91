//! Prompt construction for one submission.

use crate::advisory::submission::{ImageFormat, Submission};
use crate::llm::models::{ContentPart, LlmMessage};
use base64::Engine;

/// Section labels the model is told to answer with, in order
pub const LABELS: [&str; 3] = ["Problem Summary", "Suggested Fixer", "Why"];

/// Fixed instruction that always opens the prompt
pub const INSTRUCTION: &str = "You are LocalFix AI. \nAnalyze this input and respond in this format:\n\nProblem Summary: ...\nSuggested Fixer: ...\nWhy: ...";

/// Prefix for the user's own description
pub const DESCRIPTION_PREFIX: &str = "User description: ";

/// One ordered piece of the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Instruction(String),
    Text(String),
    Image {
        media_type: &'static str,
        /// base64, standard alphabet with padding
        data: String,
    },
}

/// Ordered prompt segments: instruction, then description, then image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    segments: Vec<Segment>,
}

impl PromptPayload {
    /// Build the prompt for a submission.
    ///
    /// With `legacy_png_media_type` set every image is tagged `image/png` regardless of
    /// its real format; otherwise the sniffed media type is used.
    pub fn build(submission: &Submission, legacy_png_media_type: bool) -> Self {
        let mut segments = vec![Segment::Instruction(INSTRUCTION.to_string())];

        if let Some(text) = submission.text() {
            segments.push(Segment::Text(format!("{}{}", DESCRIPTION_PREFIX, text)));
        }

        if let Some(image) = submission.image.as_ref().filter(|i| !i.bytes().is_empty()) {
            let media_type = if legacy_png_media_type {
                ImageFormat::Png.media_type()
            } else {
                image.format().media_type()
            };
            segments.push(Segment::Image {
                media_type,
                data: base64::engine::general_purpose::STANDARD.encode(image.bytes()),
            });
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_image(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Image { .. }))
    }

    /// Convert into the single user message sent to the provider.
    pub fn to_message(&self) -> LlmMessage {
        let parts = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Instruction(text) | Segment::Text(text) => ContentPart::text(text.clone()),
                Segment::Image { media_type, data } => ContentPart::image(*media_type, data.clone()),
            })
            .collect();

        LlmMessage::user_parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::submission::tests::{tiny_jpeg, tiny_png};
    use crate::advisory::submission::ImageUpload;

    fn decode(data: &str) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD.decode(data).unwrap()
    }

    fn text_segments(payload: &PromptPayload) -> Vec<&str> {
        payload
            .segments()
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn image_segments(payload: &PromptPayload) -> Vec<(&'static str, &str)> {
        payload
            .segments()
            .iter()
            .filter_map(|s| match s {
                Segment::Image { media_type, data } => Some((*media_type, data.as_str())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_instruction_lists_labels_in_order() {
        let positions: Vec<usize> = LABELS.iter().map(|l| INSTRUCTION.find(l).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_text_only_payload() {
        let submission = Submission::collect(None, Some("sink is leaking".to_string()));
        let payload = PromptPayload::build(&submission, false);

        assert_eq!(payload.segments().len(), 2);
        assert_eq!(payload.segments()[0], Segment::Instruction(INSTRUCTION.to_string()));
        assert_eq!(text_segments(&payload), vec!["User description: sink is leaking"]);
        assert!(!payload.has_image());
    }

    #[test]
    fn test_image_only_payload() {
        let image = ImageUpload::from_upload(Some("leak.png"), None, tiny_png()).unwrap();
        let payload = PromptPayload::build(&Submission::collect(image, None), false);

        assert_eq!(payload.segments().len(), 2);
        assert!(matches!(payload.segments()[0], Segment::Instruction(_)));
        assert!(text_segments(&payload).is_empty());

        let images = image_segments(&payload);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].0, "image/png");
        assert_eq!(decode(images[0].1), tiny_png());
    }

    #[test]
    fn test_text_and_image_order() {
        let image = ImageUpload::from_upload(Some("leak.jpg"), None, tiny_jpeg()).unwrap();
        let submission = Submission::collect(image, Some("under the sink".to_string()));
        let payload = PromptPayload::build(&submission, false);

        assert!(matches!(payload.segments()[0], Segment::Instruction(_)));
        assert!(matches!(payload.segments()[1], Segment::Text(_)));
        assert!(matches!(payload.segments()[2], Segment::Image { .. }));
        assert_eq!(text_segments(&payload).len(), 1);
        assert_eq!(image_segments(&payload).len(), 1);
    }

    #[test]
    fn test_jpeg_uses_true_media_type() {
        let image = ImageUpload::from_upload(Some("leak.jpg"), None, tiny_jpeg()).unwrap();
        let payload = PromptPayload::build(&Submission::collect(image, None), false);

        let images = image_segments(&payload);
        assert_eq!(images[0].0, "image/jpeg");
        assert_eq!(decode(images[0].1), tiny_jpeg());
    }

    #[test]
    fn test_legacy_media_type_always_png() {
        let image = ImageUpload::from_upload(Some("leak.jpg"), None, tiny_jpeg()).unwrap();
        let payload = PromptPayload::build(&Submission::collect(image, None), true);

        assert_eq!(image_segments(&payload)[0].0, "image/png");
    }

    #[test]
    fn test_description_is_not_trimmed() {
        let submission = Submission::collect(None, Some("  drip drip ".to_string()));
        let payload = PromptPayload::build(&submission, false);

        assert_eq!(text_segments(&payload), vec!["User description:   drip drip "]);
    }

    #[test]
    fn test_to_message() {
        let image = ImageUpload::from_upload(Some("leak.png"), None, tiny_png()).unwrap();
        let submission = Submission::collect(image, Some("wet floor".to_string()));
        let message = PromptPayload::build(&submission, false).to_message();

        assert_eq!(message.parts.len(), 3);
        assert_eq!(message.parts[0], ContentPart::text(INSTRUCTION));
        assert_eq!(message.parts[1], ContentPart::text("User description: wet floor"));
        assert!(matches!(&message.parts[2], ContentPart::Image { media_type, .. } if media_type == "image/png"));
    }
}
