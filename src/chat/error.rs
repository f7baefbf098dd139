use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Please configure your chat API key in settings")]
    NotConfigured,

    #[error("{0}")]
    Request(String),

    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Stream(String),

    #[error("{0}")]
    Secret(String),
}
