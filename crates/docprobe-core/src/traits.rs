use std::future::Future;

use crate::error::ProbeError;
use crate::models::RenderResult;

/// Produces the rendered markup and HTTP status for a URL.
///
/// Implementations share whatever session state they hold (a browser tab,
/// an HTTP client) across calls; callers must not render concurrently on the
/// same instance.
pub trait Renderer: Send + Sync {
    fn render(&self, url: &str) -> impl Future<Output = Result<RenderResult, ProbeError>> + Send;

    /// Releases the resources behind this renderer. Called once at teardown.
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized,
    {
        async {}
    }
}
