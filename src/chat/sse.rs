//! Incremental decoder for OpenAI-style `text/event-stream` completions

use super::error::ChatError;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A content delta (may be empty)
    Delta(String),
    /// `data: [DONE]`
    Done,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamErrorBody {
    message: Option<String>,
}

/// Buffers partial lines across network chunks.
///
/// An error payload stops decoding. Events decoded ahead of it are still
/// returned; the error is held until [`SseDecoder::take_error`].
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    failure: Option<ChatError>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the events completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        if self.failure.is_some() {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            match decode_line(&String::from_utf8_lossy(&line)) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    self.failure = Some(e);
                    self.buffer.clear();
                    break;
                }
            }
        }

        events
    }

    /// Decode whatever is left once the body ends without a trailing newline.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if self.failure.is_some() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        match decode_line(&String::from_utf8_lossy(&rest)) {
            Ok(event) => event,
            Err(e) => {
                self.failure = Some(e);
                None
            }
        }
    }

    /// The error payload that stopped decoding, if any
    pub fn take_error(&mut self) -> Option<ChatError> {
        self.failure.take()
    }
}

fn decode_line(line: &str) -> Result<Option<SseEvent>, ChatError> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(Some(SseEvent::Done));
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!("Skipping undecodable stream line: {}", e);
            return Ok(None);
        }
    };

    if let Some(err) = chunk.error {
        return Err(ChatError::Stream(
            err.message.unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }

    let content = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content)
        .unwrap_or_default();

    Ok(Some(SseEvent::Delta(content)))
}
