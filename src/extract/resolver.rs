use super::error::ExtractError;
use super::types::{Extraction, Extractor};
use crate::cache::ResultCache;
use crate::validation::validate_url;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DIRECT_VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".webm", ".ogg", ".m3u8", ".mpd"];

/// Front door for extraction: validates, short-circuits and caches
pub struct VideoResolver {
    cache: ResultCache,
    extractor: Arc<dyn Extractor>,
}

impl VideoResolver {
    pub fn new(extractor: Arc<dyn Extractor>, ttl: Duration) -> Self {
        Self {
            cache: ResultCache::new(ttl),
            extractor,
        }
    }

    pub async fn resolve(&self, url: &str) -> Result<Extraction, ExtractError> {
        validate_url(url)?;

        if let Some(cached) = self.cache.get(url) {
            info!("Extraction cache hit for {}", url);
            return Ok(cached);
        }

        if is_direct_video_url(url) {
            return Ok(Extraction {
                video_url: url.to_string(),
                title: "Direct Video".to_string(),
                captions: Vec::new(),
            });
        }

        let mut extraction = self.extractor.extract(url).await?;
        if extraction.video_url.is_empty() {
            return Err(ExtractError::NoVideo);
        }
        if extraction.title.is_empty() {
            extraction.title = "Unknown".to_string();
        }

        self.cache.set(url, extraction.clone());
        info!("Resolved {} ({} caption tracks)", url, extraction.captions.len());

        Ok(extraction)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}

/// True when the URL path already points at a media file or manifest
pub fn is_direct_video_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path().to_ascii_lowercase();
            DIRECT_VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        }
        Err(_) => false,
    }
}
