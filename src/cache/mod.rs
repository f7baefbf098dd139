//! Time-bounded result caches
//!
//! Two instances share one contract:
//! - `ResultCache` - source page URL → resolved extraction
//! - `TranscriptCache` - caption URL → parsed transcript
//!
//! Entries older than the TTL are treated as absent and are removed either
//! lazily on `get` or by the periodic `cleanup` sweep.

mod ttl;

pub use ttl::TtlCache;

use crate::extract::Extraction;
use crate::transcript::TranscriptResult;

/// Extraction results keyed by source URL
pub type ResultCache = TtlCache<Extraction>;

/// Parsed transcripts keyed by caption URL
pub type TranscriptCache = TtlCache<TranscriptResult>;
