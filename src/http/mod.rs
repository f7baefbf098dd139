//! Loopback ingestion API for the browser extension
//!
//! This module accepts URLs pushed from the extension:
//! - GET /ping - Liveness probe
//! - POST /send-url - Validate `{url, title?}` and hand it to the UI
//! - OPTIONS * - CORS preflight
//! - anything else - 404
//!
//! The listener binds 127.0.0.1 only.

mod cors;
mod error;
pub mod handlers;
mod routes;
mod server;
mod state;

pub use cors::is_allowed_origin;
pub use error::IngestError;
pub use routes::create_router;
pub use server::{IngestionServer, ServerError};
pub use state::{AppState, IngestLimits};
