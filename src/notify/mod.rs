//! UI notification seam
//!
//! The ingestion server never talks to a window directly. It hands
//! validated URLs to a `Notifier`, which the host wires to its UI.

use serde::Serialize;
use std::io::Write;
use tracing::{error, info};

/// Instructions the core sends to the UI
pub trait Notifier: Send + Sync {
    /// Raise the main window
    fn show(&self);

    /// Give the main window input focus
    fn focus(&self);

    /// Hand over a URL to play
    fn deliver(&self, url: &str, title: &str);

    /// Surface a failure the user should know about
    fn report_error(&self, message: &str);
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum UiEvent<'a> {
    PlayUrl { url: &'a str, title: &'a str },
    Show,
    Focus,
    Error { message: &'a str },
}

/// Writes one JSON object per line to stdout for a GUI bridge process to consume
#[derive(Debug, Default)]
pub struct JsonLinesNotifier;

impl JsonLinesNotifier {
    pub fn new() -> Self {
        Self
    }

    fn emit(&self, event: &UiEvent<'_>) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode UI event: {}", e);
                return;
            }
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line).and_then(|_| stdout.flush()) {
            error!("Failed to write UI event: {}", e);
        }
    }
}

impl Notifier for JsonLinesNotifier {
    fn show(&self) {
        self.emit(&UiEvent::Show);
    }

    fn focus(&self) {
        self.emit(&UiEvent::Focus);
    }

    fn deliver(&self, url: &str, title: &str) {
        info!("Delivering {} ({}) to UI", url, title);
        self.emit(&UiEvent::PlayUrl { url, title });
    }

    fn report_error(&self, message: &str) {
        self.emit(&UiEvent::Error { message });
    }
}
