//! Explicit application context
//!
//! Built once at startup and passed to whatever needs a service. It owns
//! the caches (through the resolver and pipeline), the chat relay, the
//! notifier, and every background task it spawns.

use crate::chat::{ChatBackend, OpenAiChatBackend, SecretStore, StreamRelay, CHAT_API_KEY};
use crate::config::Config;
use crate::extract::{Extractor, VideoResolver};
use crate::http::{AppState, IngestLimits, IngestionServer, ServerError};
use crate::notify::Notifier;
use crate::transcript::{CaptionSource, TranscriptPipeline};
use anyhow::Result;
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// External collaborators the core is wired to
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub extractor: Arc<dyn Extractor>,
    pub captions: Arc<dyn CaptionSource>,
    pub secrets: Arc<dyn SecretStore>,
    /// Pre-built backend; when absent one is built from the stored credential
    pub chat_backend: Option<Arc<dyn ChatBackend>>,
}

pub struct AppContext {
    pub config: Config,
    pub resolver: Arc<VideoResolver>,
    pub transcripts: Arc<TranscriptPipeline>,
    pub relay: Arc<StreamRelay>,
    pub notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AppContext {
    pub fn new(config: Config, collaborators: Collaborators) -> Result<Self> {
        let Collaborators {
            notifier,
            extractor,
            captions,
            secrets,
            chat_backend,
        } = collaborators;

        let chat_backend = match chat_backend {
            Some(backend) => Some(backend),
            None => Self::backend_from_secrets(&config, secrets.as_ref())?,
        };

        let resolver = Arc::new(VideoResolver::new(extractor, config.cache.result_ttl()));
        let transcripts = Arc::new(TranscriptPipeline::new(
            captions,
            config.cache.transcript_ttl(),
            config.transcript.fetch_timeout(),
        ));
        let relay = Arc::new(StreamRelay::new(chat_backend));

        Ok(Self {
            config,
            resolver,
            transcripts,
            relay,
            notifier,
            shutdown: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    fn backend_from_secrets(
        config: &Config,
        secrets: &dyn SecretStore,
    ) -> Result<Option<Arc<dyn ChatBackend>>> {
        match secrets.get(CHAT_API_KEY)? {
            Some(key) if !key.is_empty() => {
                let backend = OpenAiChatBackend::new(&config.chat, &key)?;
                info!("Chat backend configured (model {})", backend.model());
                Ok(Some(Arc::new(backend)))
            }
            _ => {
                warn!("No chat API key configured; chat is disabled");
                Ok(None)
            }
        }
    }

    /// Token cancelled by [`AppContext::shutdown`]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Sweep both caches on a fixed interval until shutdown.
    pub fn start_sweeper(&self) {
        let period = self.config.cache.cleanup_interval();
        let handle = spawn_cache_sweeper(
            Arc::clone(&self.resolver),
            Arc::clone(&self.transcripts),
            period,
            self.shutdown.child_token(),
        );
        self.tasks.lock().push(handle);
    }

    /// Bind the loopback listener and serve in the background.
    pub async fn start_ingestion(&self) -> Result<SocketAddr, ServerError> {
        let http = &self.config.service.http;
        let state = AppState::new(Arc::clone(&self.notifier), IngestLimits::from(http));

        let server = IngestionServer::start(state, http.port, self.shutdown.child_token()).await?;
        let addr = server.local_addr();
        self.tasks.lock().push(server.into_handle());

        Ok(addr)
    }

    /// Cancel background work and wait for it to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down");
        self.shutdown.cancel();

        let tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                error!("Background task panicked: {}", e);
            }
        }
    }
}

/// Periodically drop expired entries from the extraction and transcript caches.
pub fn spawn_cache_sweeper(
    resolver: Arc<VideoResolver>,
    transcripts: Arc<TranscriptPipeline>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        info!("Cache sweeper started (every {:?})", period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let stale_results = resolver.cache().cleanup();
                    let stale_transcripts = transcripts.cleanup();
                    debug!(
                        "Cache sweep removed {} extraction and {} transcript entries",
                        stale_results, stale_transcripts
                    );
                }
            }
        }

        info!("Cache sweeper stopped");
    })
}
