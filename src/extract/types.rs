use super::error::ExtractError;
use crate::transcript::CaptionTrack;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved media link plus its caption tracks (most preferred first)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub video_url: String,
    pub title: String,
    pub captions: Vec<CaptionTrack>,
}

/// Resolves a source page URL into something playable
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Extraction, ExtractError>;
}

/// Extraction outcome as sent to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Extraction, ExtractError>> for ExtractResult {
    fn from(result: Result<Extraction, ExtractError>) -> Self {
        match result {
            Ok(extraction) => Self {
                success: true,
                video_url: Some(extraction.video_url),
                title: Some(extraction.title),
                error: None,
            },
            Err(e) => Self {
                success: false,
                video_url: None,
                title: None,
                error: Some(e.to_string()),
            },
        }
    }
}
