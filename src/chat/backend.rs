use super::error::ChatError;
use super::sse::{SseDecoder, SseEvent};
use super::types::{Conversation, TurnRole};
use crate::config::ChatConfig;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Ordered text pieces produced by a backend
pub type ChatStream = BoxStream<'static, Result<String, ChatError>>;

/// The LLM collaborator
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Submit a seeded conversation; the last turn is the new user message.
    async fn stream(&self, conversation: Conversation) -> Result<ChatStream, ChatError>;
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

/// Streams completions from an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChatBackend {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiChatBackend {
    pub fn new(config: &ChatConfig, api_key: &str) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ChatError::Request(format!("Invalid API key header value: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ChatError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn stream(&self, conversation: Conversation) -> Result<ChatStream, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Streaming chat completion from {} ({} turns)", url, conversation.turns.len());

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: conversation
                .turns
                .into_iter()
                .map(|turn| WireMessage {
                    role: match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Model => "assistant",
                    },
                    content: turn.text,
                })
                .collect(),
            stream: true,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(|e| e.to_string()))
            .boxed();

        Ok(decode_pieces(body))
    }
}

struct DecodeState {
    body: BoxStream<'static, Result<Vec<u8>, String>>,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    failure: Option<ChatError>,
    finished: bool,
}

impl DecodeState {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            match event {
                SseEvent::Delta(text) if !self.finished => self.pending.push_back(text),
                SseEvent::Delta(_) => {}
                SseEvent::Done => self.finished = true,
            }
        }
    }
}

/// Turn an SSE byte stream into content pieces, in arrival order.
///
/// Pieces decoded before a failure are still yielded; the failure follows them
/// and ends the stream.
pub fn decode_pieces(body: BoxStream<'static, Result<Vec<u8>, String>>) -> ChatStream {
    let state = DecodeState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        failure: None,
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(piece) = st.pending.pop_front() {
                return Some((Ok(piece), st));
            }
            if let Some(err) = st.failure.take() {
                return Some((Err(err), st));
            }
            if st.finished {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => {
                    let events = st.decoder.push(&bytes);
                    st.absorb(events);
                }
                Some(Err(e)) => {
                    st.failure = Some(ChatError::Stream(e));
                    st.finished = true;
                }
                None => {
                    if let Some(event) = st.decoder.finish() {
                        st.absorb(vec![event]);
                    }
                    st.finished = true;
                }
            }

            if let Some(err) = st.decoder.take_error() {
                st.failure = Some(err);
                st.finished = true;
            }
        }
    })
    .boxed()
}
