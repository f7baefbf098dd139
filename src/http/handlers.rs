use super::error::IngestError;
use super::state::AppState;
use crate::validation::{sanitize_title, validate_url_value};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    BoxError,
};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use tower::timeout::error::Elapsed;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

/// A validated `/send-url` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendUrlRequest {
    /// Normalized http(s) URL
    pub url: String,

    /// Sanitized display title
    pub title: String,
}

impl SendUrlRequest {
    /// Validate a decoded JSON body. Only `url` can fail; `title` falls back to a default.
    pub fn from_json(body: &Value) -> Result<Self, IngestError> {
        let url = validate_url_value(body.get("url"))?;
        let title = sanitize_title(body.get("title"));
        Ok(Self { url, title })
    }
}

#[derive(Debug, Serialize)]
pub struct SendUrlResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ping
/// Liveness probe for the extension
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// POST /send-url
/// Validate a URL from the extension and hand it to the UI
pub async fn send_url(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<SendUrlResponse>, IngestError> {
    let raw = read_body_capped(&headers, body, state.limits.max_body_bytes).await?;

    let payload: Value = serde_json::from_slice(&raw).map_err(|_| IngestError::InvalidJson)?;

    let request = SendUrlRequest::from_json(&payload).map_err(|e| {
        warn!("Rejected URL from extension: {}", e);
        e
    })?;

    info!("Received URL from extension: {}", request.url);

    let notifier = &state.notifier;
    notifier.deliver(&request.url, &request.title);
    notifier.show();
    notifier.focus();

    Ok(Json(SendUrlResponse { success: true }))
}

/// Fallback for unknown paths and unsupported methods
pub async fn not_found() -> IngestError {
    IngestError::NotFound
}

/// Accumulate the body chunk by chunk, refusing as soon as the cap would be exceeded.
///
/// A declared Content-Length over the cap is refused before any chunk is read.
pub async fn read_body_capped(
    headers: &HeaderMap,
    body: Body,
    cap: usize,
) -> Result<Vec<u8>, IngestError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > cap) {
        warn!("Refusing body with declared length {:?} (cap {})", declared, cap);
        return Err(IngestError::BodyTooLarge);
    }

    let mut stream = body.into_data_stream();
    let mut buf = Vec::with_capacity(declared.unwrap_or(0));

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            warn!("Failed to read request body: {}", e);
            IngestError::BodyRead
        })?;

        if buf.len() + chunk.len() > cap {
            warn!("Request body exceeded {} bytes; aborting", cap);
            return Err(IngestError::BodyTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

/// Maps a middleware failure (in practice the request deadline) to a JSON error
pub async fn middleware_error(err: BoxError) -> IngestError {
    if err.is::<Elapsed>() {
        warn!("Request exceeded its deadline");
        IngestError::Timeout
    } else {
        error!("Unhandled middleware error: {}", err);
        IngestError::Internal
    }
}

/// Converts a handler panic into a JSON 500 so the listener keeps serving
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    IngestError::Internal.into_response()
}
