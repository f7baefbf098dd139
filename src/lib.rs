pub mod cache;
pub mod chat;
pub mod config;
pub mod context;
pub mod extract;
pub mod http;
pub mod notify;
pub mod transcript;
pub mod validation;

pub use cache::{ResultCache, TranscriptCache, TtlCache};
pub use chat::{
    ChatBackend, ChatEvent, ChatMessage, ChatRole, ChatSession, EnvSecretStore, SecretStore,
    StreamRelay,
};
pub use config::Config;
pub use context::{AppContext, Collaborators};
pub use extract::{ExtractResult, Extraction, Extractor, VideoResolver, YtDlpExtractor};
pub use http::{create_router, AppState, IngestionServer};
pub use notify::{JsonLinesNotifier, Notifier};
pub use transcript::{
    parse_vtt, CaptionSource, CaptionTrack, HttpCaptionSource, TranscriptPipeline,
    TranscriptResult, TranscriptSegment,
};
