use super::relay::StreamRelay;
use super::types::{ChatEvent, ChatMessage};
use tracing::warn;

/// Owns the ordered chat history for one UI session
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Ask a question and stream the answer through `on_chunk`.
    ///
    /// Returns the appended assistant message: the full answer, or
    /// `Error: ...` when the stream failed (partial text is discarded).
    /// Blank input is ignored and returns `None`.
    pub async fn send<F>(
        &mut self,
        relay: &StreamRelay,
        transcript: Option<&str>,
        text: &str,
        mut on_chunk: F,
    ) -> Option<&ChatMessage>
    where
        F: FnMut(&str),
    {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }

        let mut events = relay.stream_chat(content, transcript, &self.messages);
        self.messages.push(ChatMessage::user(content));

        let mut answer = String::new();
        let mut outcome = None;

        while let Some(event) = events.recv().await {
            match event {
                ChatEvent::Chunk(piece) => {
                    on_chunk(&piece);
                    answer.push_str(&piece);
                }
                ChatEvent::Complete => {
                    outcome = Some(Ok(()));
                    break;
                }
                ChatEvent::Error(message) => {
                    outcome = Some(Err(message));
                    break;
                }
            }
        }

        let reply = match outcome {
            Some(Ok(())) if answer.is_empty() => return None,
            Some(Ok(())) => ChatMessage::assistant(answer),
            Some(Err(message)) => ChatMessage::assistant(format!("Error: {}", message)),
            None => {
                warn!("Chat stream ended without a terminal event");
                ChatMessage::assistant("Error: Chat stream ended unexpectedly")
            }
        };

        self.messages.push(reply);
        self.messages.last()
    }
}
