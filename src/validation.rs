//! Input checks for URLs and titles arriving from the browser extension.

use reqwest::Url;
use thiserror::Error;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const DEFAULT_TITLE: &str = "External Video";

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL must be a non-empty string")]
    Empty,

    #[error("URL exceeds maximum length")]
    TooLong,

    #[error("Only HTTP/HTTPS URLs are allowed")]
    Protocol,

    #[error("Invalid URL format")]
    Malformed,
}

/// Validate a candidate URL and return its normalized (serialized) form.
///
/// Length is counted in characters on the raw input, before parsing.
pub fn validate_url(raw: &str) -> Result<String, UrlError> {
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }
    if raw.chars().count() > MAX_URL_LENGTH {
        return Err(UrlError::TooLong);
    }

    let parsed = Url::parse(raw).map_err(|_| UrlError::Malformed)?;
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(UrlError::Protocol);
    }

    Ok(parsed.into())
}

/// Validate an untyped JSON value (e.g. the `url` field of a request body).
pub fn validate_url_value(value: Option<&serde_json::Value>) -> Result<String, UrlError> {
    match value.and_then(|v| v.as_str()) {
        Some(raw) => validate_url(raw),
        None => Err(UrlError::Empty),
    }
}

/// Strip angle brackets and cap the length; anything unusable becomes [`DEFAULT_TITLE`].
pub fn sanitize_title(value: Option<&serde_json::Value>) -> String {
    let Some(raw) = value.and_then(|v| v.as_str()) else {
        return DEFAULT_TITLE.to_string();
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_TITLE_LENGTH)
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}
