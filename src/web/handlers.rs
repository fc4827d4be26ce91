use crate::advisory::{AdvisoryFields, ImageUpload, Submission, SubmissionState};
use crate::error::{LocalFixError, Result};
use crate::web::page::{render_page, Outcome};
use crate::web::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{Html, Json},
};
use serde::Serialize;
use tracing::{debug, warn};

pub const IMAGE_FIELD: &str = "image";
pub const PROBLEM_FIELD: &str = "problem";

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub rendered: String,
    pub raw: String,
    pub fields: AdvisoryFields,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

fn upload_error(err: MultipartError) -> LocalFixError {
    LocalFixError::EncodingError(format!("Could not read the upload: {}", err.body_text()))
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// The two form fields as received, before the image is checked
#[derive(Default)]
pub struct FormInput {
    pub problem_text: Option<String>,
    image: Option<UploadedFile>,
}

impl FormInput {
    /// Check the image against the upload whitelist and pair it with the description.
    pub fn into_submission(self) -> Result<Submission> {
        let image = match self.image {
            Some(file) => ImageUpload::from_upload(
                file.file_name.as_deref(),
                file.content_type.as_deref(),
                file.bytes,
            )?,
            None => None,
        };

        Ok(Submission::collect(image, self.problem_text))
    }
}

/// Read the two optional form fields. Unknown fields are ignored.
pub async fn read_form(multipart: &mut Multipart) -> Result<FormInput> {
    debug!(state = %SubmissionState::Collecting, "Reading form");

    let mut form = FormInput::default();

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(upload_error)?;
                form.image = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some(PROBLEM_FIELD) => {
                form.problem_text = Some(field.text().await.map_err(upload_error)?);
            }
            other => {
                debug!(field = ?other, "Ignoring unexpected form field");
            }
        }
    }

    Ok(form)
}

/// Read the form into a [`Submission`], checking the image on the way.
pub async fn read_submission(multipart: &mut Multipart) -> Result<Submission> {
    read_form(multipart).await?.into_submission()
}

pub fn status_for(err: &LocalFixError) -> StatusCode {
    match err {
        LocalFixError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LocalFixError::EncodingError(_) | LocalFixError::IoError(_) => StatusCode::BAD_REQUEST,
        LocalFixError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LocalFixError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn outcome_for(err: &LocalFixError) -> Outcome {
    match err {
        LocalFixError::ValidationError(msg) => Outcome::Invalid(msg.clone()),
        LocalFixError::EncodingError(msg) => Outcome::Failed(msg.clone()),
        LocalFixError::ConfigError(_) => {
            Outcome::Failed("The assistant is not configured correctly.".to_string())
        }
        LocalFixError::TimeoutError(_) => {
            Outcome::Failed("The analysis service took too long to answer.".to_string())
        }
        _ => Outcome::Failed("The analysis service could not be reached or answered badly.".to_string()),
    }
}

pub async fn index() -> Html<String> {
    Html(render_page(&Outcome::Idle, ""))
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "Unreadable form");
            return (status_for(&e), Html(render_page(&outcome_for(&e), "")));
        }
    };

    let problem_text = form.problem_text.clone().unwrap_or_default();

    let submission = match form.into_submission() {
        Ok(submission) => submission,
        Err(e) => {
            warn!(error = %e, "Rejected upload");
            return (status_for(&e), Html(render_page(&outcome_for(&e), &problem_text)));
        }
    };

    match state.client.advise(&submission).await {
        Ok(advice) => (
            StatusCode::OK,
            Html(render_page(&Outcome::Advice(advice.rendered), &problem_text)),
        ),
        Err(e) => (status_for(&e), Html(render_page(&outcome_for(&e), &problem_text))),
    }
}

pub async fn analyze_json(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> std::result::Result<Json<AdviceResponse>, (StatusCode, Json<ErrorResponse>)> {
    let to_response = |e: LocalFixError| {
        (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
                kind: e.kind(),
            }),
        )
    };

    let submission = read_submission(&mut multipart).await.map_err(to_response)?;
    let advice = state.client.advise(&submission).await.map_err(to_response)?;

    Ok(Json(AdviceResponse {
        rendered: advice.rendered,
        raw: advice.reply.raw_text().to_string(),
        fields: advice.fields,
    }))
}
