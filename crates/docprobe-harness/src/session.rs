//! Server/browser session: the static server and the renderer shared by every
//! scenario of a run.
//!
//! A session is created once before the first scenario and released once
//! after the last. [`Session::scoped`] guarantees the release on every exit
//! path, panics included.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use futures::FutureExt;
use url::Url;

use docprobe_core::error::ProbeError;
use docprobe_core::traits::Renderer;

use crate::port::PortNegotiator;
use crate::server::{ServerConfig, StaticServer};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub site_root: PathBuf,
    pub spa_fallback: bool,
}

pub struct Session<R: Renderer> {
    server: StaticServer,
    renderer: R,
}

impl<R: Renderer> Session<R> {
    /// Start the static server for an already launched renderer.
    ///
    /// On failure the renderer is closed before the error is returned, so a
    /// failed setup leaves nothing running.
    pub async fn start(
        config: &SessionConfig,
        ports: &PortNegotiator,
        renderer: R,
    ) -> Result<Self, ProbeError> {
        let server_config = ServerConfig {
            root: config.site_root.clone(),
            spa_fallback: config.spa_fallback,
        };

        let bound = match ports.port().await {
            Ok(port) => StaticServer::bind(&server_config, port).await,
            Err(e) => Err(e),
        };

        match bound {
            Ok(server) => {
                tracing::info!(base_url = %server.base_url(), "Session started");
                Ok(Self { server, renderer })
            }
            Err(e) => {
                renderer.close().await;
                Err(e)
            }
        }
    }

    pub fn base_url(&self) -> &Url {
        self.server.base_url()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Release the renderer and the server.
    pub async fn close(self) {
        self.renderer.close().await;
        self.server.shutdown().await;
        tracing::info!("Session closed");
    }

    /// Run `f` with this session, then close it whether `f` returns or panics.
    pub async fn scoped<T>(self, f: impl AsyncFnOnce(&Session<R>) -> T) -> T {
        let outcome = AssertUnwindSafe(f(&self)).catch_unwind().await;
        self.close().await;
        match outcome {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
