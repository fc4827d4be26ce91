pub mod client;
pub mod payload;
pub mod render;
pub mod reply;
pub mod submission;

pub use client::{Advice, AdvisoryClient, SubmissionState};
pub use payload::{PromptPayload, Segment, LABELS};
pub use reply::{AdvisoryFields, AdvisoryReply};
pub use submission::{ImageFormat, ImageUpload, Submission};
