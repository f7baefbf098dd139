use crate::config::HttpConfig;
use crate::notify::Notifier;
use std::sync::Arc;
use std::time::Duration;

/// Request limits applied by the ingestion router
#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for IngestLimits {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
            request_timeout: config.request_timeout(),
        }
    }
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Receives validated URLs
    pub notifier: Arc<dyn Notifier>,

    pub limits: IngestLimits,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>, limits: IngestLimits) -> Self {
        Self { notifier, limits }
    }
}
