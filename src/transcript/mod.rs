//! Caption transcripts
//!
//! This module turns a caption track chosen by the extractor into structured dialogue:
//! - Fetch the raw WebVTT payload (time-bounded, via a `CaptionSource`)
//! - Parse cues into cleaned, de-duplicated segments
//! - Cache successful results by caption URL

mod error;
mod pipeline;
mod source;
mod types;
pub mod vtt;

pub use error::TranscriptError;
pub use pipeline::TranscriptPipeline;
pub use source::{CaptionSource, HttpCaptionSource};
pub use types::{CaptionTrack, TranscriptResult, TranscriptSegment};
pub use vtt::parse_vtt;
