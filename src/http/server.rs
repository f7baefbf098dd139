use super::routes::create_router;
use super::state::AppState;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Port {0} is already in use")]
    AddrInUse(u16),

    #[error("Failed to bind port {port}: {source}")]
    Bind { port: u16, source: io::Error },
}

/// A bound, running ingestion listener
pub struct IngestionServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl IngestionServer {
    /// Bind 127.0.0.1:`port` and start serving until `shutdown` is cancelled.
    ///
    /// A bind failure is reported to the UI through the state's notifier and
    /// returned; it never takes the process down.
    pub async fn start(
        state: AppState,
        port: u16,
        shutdown: CancellationToken,
    ) -> Result<Self, ServerError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                let err = if e.kind() == io::ErrorKind::AddrInUse {
                    ServerError::AddrInUse(port)
                } else {
                    ServerError::Bind { port, source: e }
                };
                error!("Ingestion server unavailable: {}", err);
                state.notifier.report_error(&err.to_string());
                return Err(err);
            }
        };

        let local_addr = listener.local_addr().map_err(|e| ServerError::Bind { port, source: e })?;
        let app = create_router(state);

        info!("Ingestion server listening on {}", local_addr);

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
            {
                error!("Ingestion server error: {}", e);
            }
            info!("Ingestion server on {} stopped", local_addr);
        });

        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the serve loop to exit (after its shutdown token fires)
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            error!("Ingestion server task panicked: {}", e);
        }
    }

    pub fn into_handle(self) -> JoinHandle<()> {
        self.handle
    }
}
