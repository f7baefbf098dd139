use crate::validation::UrlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    InvalidUrl(#[from] UrlError),

    #[error("Failed to run extractor: {0}")]
    Spawn(String),

    #[error("Extraction timed out")]
    Timeout,

    #[error("Extractor failed: {0}")]
    Failed(String),

    #[error("No playable video found")]
    NoVideo,
}
