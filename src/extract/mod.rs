//! Source page → playable media resolution
//!
//! - `Extractor` - the collaborator that does the expensive work
//! - `VideoResolver` - validation, direct-link shortcut and the result cache
//! - `YtDlpExtractor` - adapter over an external yt-dlp style program

mod error;
mod resolver;
mod types;
mod ytdlp;

pub use error::ExtractError;
pub use resolver::{is_direct_video_url, VideoResolver};
pub use types::{ExtractResult, Extraction, Extractor};
pub use ytdlp::{select_captions, YtDlpExtractor, YtDlpInfo};
