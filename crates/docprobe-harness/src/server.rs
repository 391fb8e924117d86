//! Static file server for the pre-built documentation site.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use url::Url;

use docprobe_core::error::ProbeError;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory holding the built site.
    pub root: PathBuf,
    /// Answer unknown paths with the root `index.html` (history-mode SPA routing).
    pub spa_fallback: bool,
}

/// Build the router serving `config.root`.
///
/// Directories resolve to their `index.html`; paths without a trailing slash
/// that name a directory are redirected to the slash form.
pub fn router(config: &ServerConfig) -> Router {
    let files = ServeDir::new(&config.root).append_index_html_on_directories(true);
    let router = if config.spa_fallback {
        Router::new().fallback_service(files.fallback(ServeFile::new(config.root.join("index.html"))))
    } else {
        Router::new().fallback_service(files)
    };
    router.layer(TraceLayer::new_for_http())
}

/// A running static server. Stops on [`StaticServer::shutdown`] or when dropped.
pub struct StaticServer {
    addr: SocketAddr,
    base_url: Url,
    shutdown: CancellationToken,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl StaticServer {
    /// Bind `127.0.0.1:port` and start serving in the background.
    pub async fn bind(config: &ServerConfig, port: u16) -> Result<Self, ProbeError> {
        if !config.root.is_dir() {
            return Err(ProbeError::ServerError(format!(
                "Site directory {} does not exist (build the site first)",
                config.root.display()
            )));
        }

        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| ProbeError::ServerError(format!("Failed to bind port {port}: {e}")))?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}/"))
            .map_err(|e| ProbeError::ServerError(format!("Invalid server address {addr}: {e}")))?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        let app = router(config);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await
        });

        tracing::info!("Serving {} on http://{addr}", config.root.display());
        Ok(Self {
            addr,
            base_url,
            shutdown,
            task: Some(task),
        })
    }

    /// `http://127.0.0.1:<port>/`
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Static server stopped with error: {e}"),
                Err(e) => tracing::warn!("Static server task failed: {e}"),
            }
        }
        tracing::info!("Static server on {} stopped", self.addr);
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
