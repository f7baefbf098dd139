use crate::validation::UrlError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong handling an ingestion request
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Failed to read request body")]
    BodyRead,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("Request timeout")]
    Timeout,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error")]
    Internal,
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::BodyRead | IngestError::InvalidJson | IngestError::InvalidUrl(_) => {
                StatusCode::BAD_REQUEST
            }
            IngestError::Timeout => StatusCode::REQUEST_TIMEOUT,
            IngestError::NotFound => StatusCode::NOT_FOUND,
            IngestError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        if matches!(self, IngestError::BodyTooLarge) {
            // The rest of the body is never read; don't reuse the connection
            return (status, [(header::CONNECTION, "close")], body).into_response();
        }

        (status, body).into_response()
    }
}
