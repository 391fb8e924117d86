use tokio::net::TcpListener;
use tokio::sync::OnceCell;

use docprobe_core::error::ProbeError;

/// Picks the server port once, on first use, and hands the same value to
/// every later caller.
///
/// The preferred port is used when it is free; otherwise the OS assigns one.
#[derive(Debug)]
pub struct PortNegotiator {
    preferred: u16,
    port: OnceCell<u16>,
}

impl PortNegotiator {
    /// `preferred == 0` skips straight to an OS-assigned port.
    pub fn new(preferred: u16) -> Self {
        Self {
            preferred,
            port: OnceCell::new(),
        }
    }

    pub async fn port(&self) -> Result<u16, ProbeError> {
        self.port
            .get_or_try_init(|| negotiate(self.preferred))
            .await
            .copied()
    }

    /// The negotiated port, if negotiation already happened.
    pub fn resolved(&self) -> Option<u16> {
        self.port.get().copied()
    }
}

async fn negotiate(preferred: u16) -> Result<u16, ProbeError> {
    if preferred != 0 {
        match TcpListener::bind(("127.0.0.1", preferred)).await {
            Ok(listener) => return Ok(listener.local_addr()?.port()),
            Err(e) => tracing::info!("Preferred port {preferred} unavailable ({e}), picking another"),
        }
    }

    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(|e| ProbeError::ServerError(format!("No free port available: {e}")))?;
    Ok(listener.local_addr()?.port())
}
