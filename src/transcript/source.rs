use super::error::TranscriptError;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// Where raw caption payloads come from
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption file at `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TranscriptError>;
}

/// Fetches caption files over HTTP(S)
#[derive(Clone, Default)]
pub struct HttpCaptionSource {
    client: reqwest::Client,
}

impl HttpCaptionSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaptionSource for HttpCaptionSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TranscriptError> {
        debug!("Fetching captions from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TranscriptError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(TranscriptError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TranscriptError::Network(e.to_string()))?;

        Ok(body.to_vec())
    }
}
