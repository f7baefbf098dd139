use super::error::TranscriptError;
use super::source::CaptionSource;
use super::types::{CaptionTrack, TranscriptResult};
use super::vtt::parse_vtt;
use crate::cache::TranscriptCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Fetches, parses and caches caption transcripts
pub struct TranscriptPipeline {
    cache: TranscriptCache,
    source: Arc<dyn CaptionSource>,
    fetch_timeout: Duration,
}

impl TranscriptPipeline {
    pub fn new(source: Arc<dyn CaptionSource>, cache_ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            cache: TranscriptCache::new(cache_ttl),
            source,
            fetch_timeout,
        }
    }

    /// Fetch the transcript for a caption track.
    ///
    /// Never fails outright: transport and parse problems come back as a
    /// `success: false` result. Only successes are cached.
    pub async fn fetch_transcript(&self, track: &CaptionTrack) -> TranscriptResult {
        if let Some(cached) = self.cache.get(&track.url) {
            info!("Transcript cache hit for {}", track.url);
            return cached;
        }

        match self.load(track).await {
            Ok(result) => {
                info!(
                    "Transcript ready: {} segments ({})",
                    result.segments().len(),
                    track.language
                );
                self.cache.set(track.url.clone(), result.clone());
                result
            }
            Err(TranscriptError::Empty) => {
                TranscriptResult::failure(TranscriptError::Empty.to_string())
            }
            Err(e) => {
                error!("Failed to fetch transcript: {}", e);
                TranscriptResult::failure(format!("Failed to fetch transcript: {}", e))
            }
        }
    }

    async fn load(&self, track: &CaptionTrack) -> Result<TranscriptResult, TranscriptError> {
        // The timeout owns the fetch future; expiry drops it, aborting the request.
        let payload = tokio::time::timeout(self.fetch_timeout, self.source.fetch(&track.url))
            .await
            .map_err(|_| TranscriptError::Timeout)??;

        let segments = parse_vtt(&String::from_utf8_lossy(&payload));
        if segments.is_empty() {
            return Err(TranscriptError::Empty);
        }

        Ok(TranscriptResult::success(segments, track.language.clone()))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop expired transcripts; returns how many were removed
    pub fn cleanup(&self) -> usize {
        self.cache.cleanup()
    }
}
