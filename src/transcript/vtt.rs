//! WebVTT → transcript segments
//!
//! Only what dialogue extraction needs: cue timings and cue text. Header,
//! `NOTE` blocks, numeric cue identifiers, inline tags and cue settings are
//! discarded. Adjacent cues with identical text (rolling auto-captions) are
//! merged into one segment.

use super::types::TranscriptSegment;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static CUE_TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(\d+):)?(\d{2}):(\d{2})[.,](\d{3})\s*-->\s*(?:(\d+):)?(\d{2}):(\d{2})[.,](\d{3})",
    )
    .expect("cue timing pattern is valid")
});

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("inline tag pattern is valid"));

static CUE_SETTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:align|position|line|size):\S+").expect("cue setting pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A cue whose timing line has been seen but whose text is still accumulating
struct PendingCue {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

impl PendingCue {
    fn finish(self) -> Option<TranscriptSegment> {
        if self.lines.is_empty() || self.end <= self.start {
            return None;
        }

        let text = clean_text(&self.lines.join(" "));
        if text.is_empty() {
            return None;
        }

        Some(TranscriptSegment {
            start: self.start,
            end: self.end,
            text,
        })
    }
}

/// Parse a WebVTT document into ordered, de-duplicated segments.
pub fn parse_vtt(content: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    let mut pending: Option<PendingCue> = None;

    for line in content.lines() {
        let line = line.trim();

        if line.starts_with("WEBVTT") || line.starts_with("NOTE") {
            continue;
        }

        if let Some(caps) = CUE_TIMING.captures(line) {
            if let Some(segment) = pending.take().and_then(PendingCue::finish) {
                segments.push(segment);
            }
            pending = Some(PendingCue {
                start: timestamp(&caps, 1),
                end: timestamp(&caps, 5),
                lines: Vec::new(),
            });
            continue;
        }

        if line.is_empty() {
            if let Some(segment) = pending.take().and_then(PendingCue::finish) {
                segments.push(segment);
            }
            continue;
        }

        if let Some(cue) = pending.as_mut() {
            // Numeric lines are cue identifiers
            if !line.bytes().all(|b| b.is_ascii_digit()) {
                cue.lines.push(line.to_string());
            }
        }
    }

    if let Some(segment) = pending.take().and_then(PendingCue::finish) {
        segments.push(segment);
    }

    dedupe_adjacent(segments)
}

/// Strip inline tags and cue settings, then collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let text = INLINE_TAG.replace_all(text, "");
    let text = CUE_SETTING.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Seconds for the timestamp whose hour group is at `first` (minutes, seconds, millis follow).
fn timestamp(caps: &Captures<'_>, first: usize) -> f64 {
    let field = |i: usize| -> f64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0) as f64
    };

    field(first) * 3600.0 + field(first + 1) * 60.0 + field(first + 2) + field(first + 3) / 1000.0
}

fn dedupe_adjacent(segments: Vec<TranscriptSegment>) -> Vec<TranscriptSegment> {
    let mut merged: Vec<TranscriptSegment> = Vec::with_capacity(segments.len());

    for segment in segments {
        match merged.last_mut() {
            Some(last) if last.text == segment.text => {
                last.end = segment.end;
            }
            _ => merged.push(segment),
        }
    }

    merged
}
