use serde::{Deserialize, Serialize};

/// A caption track offered by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Where the WebVTT payload can be fetched
    pub url: String,

    /// Language tag (e.g. "en", "en-US")
    pub language: String,
}

/// One cue of dialogue, in seconds from the start of the video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Outcome of a transcript fetch, in the shape the UI consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<TranscriptSegment>>,

    /// Segment texts joined with single spaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscriptResult {
    pub fn success(segments: Vec<TranscriptSegment>, language: impl Into<String>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            success: true,
            segments: Some(segments),
            full_text: Some(full_text),
            language: Some(language.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            segments: None,
            full_text: None,
            language: None,
            error: Some(message.into()),
        }
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        self.segments.as_deref().unwrap_or_default()
    }

    /// Full text of a successful, non-empty transcript
    pub fn text(&self) -> Option<&str> {
        self.full_text.as_deref().filter(|t| !t.is_empty())
    }
}
