//! Transcript-grounded chat
//!
//! - `StreamRelay` - checks preconditions, seeds the conversation and turns
//!   the backend stream into ordered `ChatEvent`s
//! - `ChatBackend` - the LLM collaborator (`OpenAiChatBackend` adapter)
//! - `ChatSession` - owns and appends to the message history
//! - `SecretStore` - where the backend credential comes from

mod backend;
mod error;
mod relay;
mod secrets;
mod session;
pub mod sse;
mod types;

pub use backend::{decode_pieces, ChatBackend, ChatStream, OpenAiChatBackend};
pub use error::ChatError;
pub use relay::{StreamRelay, ASSISTANT_ACK};
pub use secrets::{masked_hint, EnvSecretStore, MemorySecretStore, SecretStore, CHAT_API_KEY};
pub use session::ChatSession;
pub use types::{ChatEvent, ChatMessage, ChatRole, ChatTurn, Conversation, TurnRole};
