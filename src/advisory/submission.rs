//! User input for one analysis request.
//!
//! A [`Submission`] pairs an optional uploaded photo with an optional free-text
//! description. Uploads are checked against the small raster whitelist here, before
//! anything leaves the process.

use crate::error::{LocalFixError, Result};
use std::path::Path;
use tracing::warn;

/// Raster formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// File extensions offered by the upload field
    pub const ACCEPTED_EXTENSIONS: [&'static str; 3] = ["jpg", "jpeg", "png"];

    /// Determine the declared format from a file name extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Determine the declared format from a MIME content type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim().to_lowercase();

        match essence.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Identify the actual format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

impl From<ImageFormat> for image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// An uploaded photo whose bytes match its declared format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl ImageUpload {
    /// Accept an upload, checking the declared format against the actual bytes.
    ///
    /// Returns `Ok(None)` for an empty upload (the browser sends an empty part when no
    /// file was chosen). The declared format comes from the file name extension, falling
    /// back to the part's content type. The bytes must decode fully as that format; a
    /// valid signature in front of a corrupt or truncated body is rejected.
    pub fn from_upload(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Option<Self>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let declared = file_name
            .and_then(ImageFormat::from_file_name)
            .or_else(|| content_type.and_then(ImageFormat::from_content_type))
            .ok_or_else(|| {
                warn!(file_name = ?file_name, content_type = ?content_type, "Rejected upload format");
                LocalFixError::EncodingError(format!(
                    "Unsupported image type for {}; upload one of: {}",
                    file_name.unwrap_or("upload"),
                    ImageFormat::ACCEPTED_EXTENSIONS.join(", ")
                ))
            })?;

        let actual = ImageFormat::sniff(&bytes).ok_or_else(|| {
            LocalFixError::EncodingError(format!(
                "{} is not a readable JPEG or PNG image",
                file_name.unwrap_or("upload")
            ))
        })?;

        if actual != declared {
            return Err(LocalFixError::EncodingError(format!(
                "{} is declared as {} but contains {} data",
                file_name.unwrap_or("upload"),
                declared.media_type(),
                actual.media_type()
            )));
        }

        if let Err(e) = image::load_from_memory_with_format(&bytes, actual.into()) {
            warn!(file_name = ?file_name, error = %e, "Upload failed to decode");
            return Err(LocalFixError::EncodingError(format!(
                "{} is not a readable {} image: {}",
                file_name.unwrap_or("upload"),
                actual.media_type(),
                e
            )));
        }

        Ok(Some(Self {
            bytes,
            format: actual,
        }))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// One user interaction: an optional photo and/or an optional description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub image: Option<ImageUpload>,
    pub problem_text: Option<String>,
}

impl Submission {
    /// Gather the two form inputs as given; no validation happens here.
    pub fn collect(image: Option<ImageUpload>, problem_text: Option<String>) -> Self {
        Self {
            image,
            problem_text,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.as_ref().is_some_and(|i| !i.bytes.is_empty())
    }

    pub fn has_text(&self) -> bool {
        self.problem_text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Description to send, if it has any non-whitespace content
    pub fn text(&self) -> Option<&str> {
        if self.has_text() {
            self.problem_text.as_deref()
        } else {
            None
        }
    }

    /// True iff there is an image or a non-blank description.
    pub fn is_valid(&self) -> bool {
        self.has_image() || self.has_text()
    }

    /// Like [`Submission::is_valid`] but as a `Result` for `?` chains.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(LocalFixError::ValidationError(
                "Upload a photo or describe the problem before asking for help".to_string(),
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    fn one_pixel(format: image::ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(1, 1)
            .write_to(&mut cursor, format)
            .unwrap();
        cursor.into_inner()
    }

    /// A decodable 1x1 PNG
    pub(crate) fn tiny_png() -> Vec<u8> {
        one_pixel(image::ImageFormat::Png)
    }

    /// A decodable 1x1 JPEG
    pub(crate) fn tiny_jpeg() -> Vec<u8> {
        one_pixel(image::ImageFormat::Jpeg)
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(ImageFormat::from_file_name("leak.PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_file_name("leak.jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_file_name("leak.jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_file_name("leak.gif"), None);
        assert_eq!(ImageFormat::from_file_name("leak"), None);
    }

    #[test]
    fn test_format_from_content_type() {
        assert_eq!(ImageFormat::from_content_type("image/png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_content_type("image/jpeg; q=1"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_content_type("image/webp"), None);
    }

    #[test]
    fn test_sniff() {
        assert_eq!(ImageFormat::sniff(&tiny_png()), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&tiny_jpeg()), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn test_upload_accepts_matching_format() {
        let upload = ImageUpload::from_upload(Some("sink.png"), None, tiny_png()).unwrap().unwrap();
        assert_eq!(upload.format(), ImageFormat::Png);
        assert_eq!(upload.bytes(), tiny_png().as_slice());
    }

    #[test]
    fn test_upload_falls_back_to_content_type() {
        let upload =
            ImageUpload::from_upload(None, Some("image/jpeg"), tiny_jpeg()).unwrap().unwrap();
        assert_eq!(upload.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_empty_upload_is_absent() {
        let upload = ImageUpload::from_upload(Some(""), Some("application/octet-stream"), vec![]);
        assert!(matches!(upload, Ok(None)));
    }

    #[test]
    fn test_upload_rejects_unlisted_format() {
        let result = ImageUpload::from_upload(Some("sink.gif"), Some("image/gif"), b"GIF89a".to_vec());
        assert!(matches!(result, Err(LocalFixError::EncodingError(_))));
    }

    #[test]
    fn test_upload_rejects_unreadable_bytes() {
        let result = ImageUpload::from_upload(Some("sink.png"), None, b"not an image".to_vec());
        assert!(matches!(result, Err(LocalFixError::EncodingError(_))));
    }

    #[test]
    fn test_upload_rejects_signature_followed_by_garbage() {
        let mut bytes = tiny_png()[..8].to_vec();
        bytes.extend_from_slice(b"this is not a png body at all");
        assert_eq!(ImageFormat::sniff(&bytes), Some(ImageFormat::Png));

        let result = ImageUpload::from_upload(Some("sink.png"), None, bytes);
        match result {
            Err(LocalFixError::EncodingError(msg)) => assert!(msg.contains("not a readable")),
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_rejects_truncated_png() {
        let full = tiny_png();
        let truncated = full[..full.len() / 2].to_vec();

        let result = ImageUpload::from_upload(Some("sink.png"), None, truncated);
        assert!(matches!(result, Err(LocalFixError::EncodingError(_))));
    }

    #[test]
    fn test_upload_rejects_mismatched_format() {
        let result = ImageUpload::from_upload(Some("sink.png"), None, tiny_jpeg());
        match result {
            Err(LocalFixError::EncodingError(msg)) => assert!(msg.contains("image/jpeg")),
            other => panic!("Expected EncodingError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_submission_is_invalid() {
        assert!(!Submission::default().is_valid());
        assert!(!Submission::collect(None, Some(String::new())).is_valid());
        assert!(!Submission::collect(None, Some("  \n\t ".to_string())).is_valid());
        assert!(matches!(
            Submission::default().validate(),
            Err(LocalFixError::ValidationError(_))
        ));
    }

    #[test]
    fn test_text_only_submission_is_valid() {
        let submission = Submission::collect(None, Some("sink is leaking".to_string()));
        assert!(submission.is_valid());
        assert_eq!(submission.text(), Some("sink is leaking"));
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_image_only_submission_is_valid() {
        let image = ImageUpload::from_upload(Some("a.png"), None, tiny_png()).unwrap();
        let submission = Submission::collect(image, None);
        assert!(submission.is_valid());
        assert!(submission.text().is_none());
    }

    #[test]
    fn test_blank_text_is_ignored_alongside_image() {
        let image = ImageUpload::from_upload(Some("a.png"), None, tiny_png()).unwrap();
        let submission = Submission::collect(image, Some("   ".to_string()));
        assert!(submission.is_valid());
        assert!(submission.text().is_none());
    }
}
