//! HTTP surface: the form page, its submit endpoint, and a JSON twin.

pub mod handlers;
pub mod page;

use crate::advisory::AdvisoryClient;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request},
    middleware::{from_fn, Next},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<AdvisoryClient>,
}

/// Give each request a correlation id and run it inside a span carrying it.
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    next.run(request).instrument(span).await
}

/// Build the application router.
///
/// Request bodies above `max_upload_bytes` are refused before the form is read.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/api/analyze", post(handlers::analyze_json))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}
