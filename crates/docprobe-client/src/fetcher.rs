use std::time::Duration;

use docprobe_core::error::ProbeError;
use docprobe_core::models::RenderResult;
use docprobe_core::traits::Renderer;
use reqwest::Client;

/// Plain HTTP renderer using reqwest.
///
/// Returns the raw HTML body without running any JavaScript. Used as the
/// fallback when browser automation fails, and on its own with `--no-browser`.
/// Non-2xx responses are results, not errors: the status is what scenarios check.
#[derive(Clone)]
pub struct HttpRenderer {
    client: Client,
    timeout_secs: u64,
}

impl HttpRenderer {
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(concat!("docprobe/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl Renderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, ProbeError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ProbeError::NetworkError(format!("Connection failed: {e}"))
            } else {
                ProbeError::HttpError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::HttpError(format!("Failed to read response body: {e}")))?;

        tracing::debug!(%url, %status, bytes = body.len(), "Fetched page over HTTP");
        Ok(RenderResult::new(status, body))
    }
}
