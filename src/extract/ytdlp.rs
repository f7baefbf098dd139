use super::error::ExtractError;
use super::types::{Extraction, Extractor};
use crate::config::ExtractorConfig;
use crate::transcript::CaptionTrack;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Subset of `--dump-single-json` output the companion uses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YtDlpInfo {
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub requested_formats: Option<Vec<YtDlpFormat>>,
    #[serde(default)]
    pub subtitles: Option<BTreeMap<String, Vec<YtDlpSubtitle>>>,
    #[serde(default)]
    pub automatic_captions: Option<BTreeMap<String, Vec<YtDlpSubtitle>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtDlpFormat {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtDlpSubtitle {
    pub ext: Option<String>,
    pub url: Option<String>,
}

impl YtDlpInfo {
    fn media_url(&self) -> Option<String> {
        self.url.clone().or_else(|| {
            self.requested_formats
                .iter()
                .flatten()
                .find_map(|f| f.url.clone())
        })
    }
}

/// Runs a yt-dlp compatible program and reads its JSON description
pub struct YtDlpExtractor {
    program: String,
    timeout: Duration,
    preferred_languages: Vec<String>,
}

impl YtDlpExtractor {
    pub fn new(config: &ExtractorConfig, preferred_languages: Vec<String>) -> Self {
        Self {
            program: config.program.clone(),
            timeout: config.timeout(),
            preferred_languages,
        }
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn extract(&self, url: &str) -> Result<Extraction, ExtractError> {
        debug!("Running {} for {}", self.program, url);

        let child = Command::new(&self.program)
            .args([
                "--dump-single-json",
                "--no-playlist",
                "--no-warnings",
                "-f",
                "best",
            ])
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ExtractError::Timeout)?
            .map_err(|e| ExtractError::Spawn(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("unknown error")
                .trim()
                .to_string();
            warn!("Extractor exited with {}: {}", output.status, reason);
            return Err(ExtractError::Failed(reason));
        }

        let info: YtDlpInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| ExtractError::Failed(format!("invalid extractor output: {}", e)))?;

        let video_url = info.media_url().ok_or(ExtractError::NoVideo)?;

        Ok(Extraction {
            video_url,
            title: info.title.clone().unwrap_or_default(),
            captions: select_captions(&info, &self.preferred_languages),
        })
    }
}

/// Order WebVTT tracks by language preference, manual tracks ahead of automatic ones.
///
/// `en` matches `en` and regional variants such as `en-US`. When no preferred
/// language is present, every manual track is offered instead.
pub fn select_captions(info: &YtDlpInfo, preferred: &[String]) -> Vec<CaptionTrack> {
    let empty = BTreeMap::new();
    let manual = info.subtitles.as_ref().unwrap_or(&empty);
    let automatic = info.automatic_captions.as_ref().unwrap_or(&empty);

    let mut tracks: Vec<CaptionTrack> = Vec::new();

    for lang in preferred {
        for source in [manual, automatic] {
            for (code, entries) in source {
                if language_matches(code, lang) {
                    push_vtt(&mut tracks, code, entries);
                }
            }
        }
    }

    if tracks.is_empty() {
        for (code, entries) in manual {
            push_vtt(&mut tracks, code, entries);
        }
    }

    tracks
}

fn language_matches(code: &str, wanted: &str) -> bool {
    code.eq_ignore_ascii_case(wanted)
        || code
            .to_ascii_lowercase()
            .starts_with(&format!("{}-", wanted.to_ascii_lowercase()))
}

fn push_vtt(tracks: &mut Vec<CaptionTrack>, code: &str, entries: &[YtDlpSubtitle]) {
    let vtt = entries
        .iter()
        .filter(|e| e.ext.as_deref() == Some("vtt"))
        .find_map(|e| e.url.clone());

    if let Some(url) = vtt {
        if !tracks.iter().any(|t| t.url == url) {
            tracks.push(CaptionTrack {
                url,
                language: code.to_string(),
            });
        }
    }
}
