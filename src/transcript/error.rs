use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Transcript request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Network(String),

    #[error("No transcript segments found")]
    Empty,
}
