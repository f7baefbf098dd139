use super::backend::ChatBackend;
use super::error::ChatError;
use super::types::{ChatEvent, ChatMessage, ChatRole, Conversation, TurnRole};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Canned model reply that closes the seeded instruction turn
pub const ASSISTANT_ACK: &str = "I understand. I'll answer questions about the video based on the transcript you provided. What would you like to know?";

const EVENT_BUFFER: usize = 64;

/// Drives one chat completion per call and relays it as ordered events.
///
/// History is only read; the caller owns it.
pub struct StreamRelay {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl StreamRelay {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Instruction turn that grounds the model in the transcript (embedded verbatim)
    pub fn system_instruction(transcript: &str) -> String {
        format!(
            "You are a helpful assistant that answers questions about a video based on its transcript. Be concise and helpful.\n\n\
             Here is the video transcript:\n---\n{}\n---\n\n\
             Answer questions based on the transcript above. If the answer isn't in the transcript, say so. Keep responses concise.",
            transcript
        )
    }

    /// Seed turns, then prior history in order, then the new message.
    pub fn build_conversation(message: &str, transcript: &str, history: &[ChatMessage]) -> Conversation {
        let mut conversation = Conversation::default();
        conversation.push(TurnRole::User, Self::system_instruction(transcript));
        conversation.push(TurnRole::Model, ASSISTANT_ACK);

        for msg in history {
            let role = match msg.role {
                ChatRole::User => TurnRole::User,
                ChatRole::Assistant => TurnRole::Model,
            };
            conversation.push(role, msg.content.clone());
        }

        conversation.push(TurnRole::User, message);
        conversation
    }

    /// Start streaming a reply.
    ///
    /// The receiver yields zero or more `Chunk`s followed by exactly one
    /// `Complete` or `Error`, then closes. Failed preconditions yield a lone
    /// `Error` without touching the backend.
    pub fn stream_chat(
        &self,
        message: &str,
        transcript: Option<&str>,
        history: &[ChatMessage],
    ) -> mpsc::Receiver<ChatEvent> {
        let backend = match self.check_preconditions(message, transcript) {
            Ok(backend) => backend,
            Err(reason) => return Self::rejected(reason),
        };

        // Preconditions guarantee a non-empty transcript here
        let conversation =
            Self::build_conversation(message, transcript.unwrap_or_default(), history);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(async move {
            let terminal = match Self::pump(backend, conversation, &tx).await {
                Ok(true) => ChatEvent::Complete,
                Ok(false) => {
                    debug!("Chat consumer went away; stopping relay");
                    return;
                }
                Err(e) => {
                    error!("Chat stream failed: {}", e);
                    ChatEvent::Error(format!("Chat request failed: {}", e))
                }
            };
            let _ = tx.send(terminal).await;
        });

        rx
    }

    fn check_preconditions(
        &self,
        message: &str,
        transcript: Option<&str>,
    ) -> Result<Arc<dyn ChatBackend>, String> {
        let Some(backend) = self.backend.clone() else {
            return Err(ChatError::NotConfigured.to_string());
        };
        if transcript.map_or(true, |t| t.trim().is_empty()) {
            return Err(
                "No transcript available. Please load a video with captions first.".to_string(),
            );
        }
        if message.trim().is_empty() {
            return Err("Message cannot be empty".to_string());
        }
        Ok(backend)
    }

    fn rejected(reason: String) -> mpsc::Receiver<ChatEvent> {
        info!("Chat request rejected: {}", reason);
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(ChatEvent::Error(reason));
        rx
    }

    /// Forward backend pieces as chunks. `Ok(false)` means the receiver was dropped.
    async fn pump(
        backend: Arc<dyn ChatBackend>,
        conversation: Conversation,
        tx: &mpsc::Sender<ChatEvent>,
    ) -> Result<bool, ChatError> {
        let mut pieces = backend.stream(conversation).await?;

        while let Some(piece) = pieces.next().await {
            let text = piece?;
            if text.is_empty() {
                continue;
            }
            if tx.send(ChatEvent::Chunk(text)).await.is_err() {
                return Ok(false);
            }
        }

        Ok(true)
    }
}
