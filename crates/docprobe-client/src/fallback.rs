use docprobe_core::error::ProbeError;
use docprobe_core::models::RenderResult;
use docprobe_core::traits::Renderer;

/// Which strategy produced a render, and why the primary was skipped.
#[derive(Debug)]
pub enum Rendered {
    Primary(RenderResult),
    Fallback {
        primary_error: ProbeError,
        result: RenderResult,
    },
}

impl Rendered {
    pub fn result(&self) -> &RenderResult {
        match self {
            Rendered::Primary(result) | Rendered::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> RenderResult {
        match self {
            Rendered::Primary(result) | Rendered::Fallback { result, .. } => result,
        }
    }

    pub fn used_fallback(&self) -> bool {
        matches!(self, Rendered::Fallback { .. })
    }
}

/// Two-strategy renderer: try `primary`, and on any error try `secondary` once.
///
/// A missing wait-selector is not an error of the primary (the browser
/// renderer swallows it), so only hard failures reach the fallback. No
/// further retries happen and nothing is cached.
pub struct FallbackRenderer<P, S> {
    primary: P,
    secondary: S,
}

impl<P: Renderer, S: Renderer> FallbackRenderer<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// Render `url`, reporting which strategy succeeded.
    ///
    /// Fails with [`ProbeError::RenderFailed`] only when both strategies fail.
    pub async fn render_with_strategy(&self, url: &str) -> Result<Rendered, ProbeError> {
        let primary_error = match self.primary.render(url).await {
            Ok(result) => return Ok(Rendered::Primary(result)),
            Err(e) => e,
        };

        tracing::warn!(%url, error = %primary_error, "Primary render failed, falling back to plain fetch");

        match self.secondary.render(url).await {
            Ok(result) => Ok(Rendered::Fallback {
                primary_error,
                result,
            }),
            Err(fallback_error) => {
                tracing::warn!(%url, error = %fallback_error, "Fallback fetch failed");
                Err(ProbeError::RenderFailed {
                    url: url.to_string(),
                    primary: primary_error.to_string(),
                    fallback: fallback_error.to_string(),
                })
            }
        }
    }
}

impl<P: Renderer, S: Renderer> Renderer for FallbackRenderer<P, S> {
    async fn render(&self, url: &str) -> Result<RenderResult, ProbeError> {
        self.render_with_strategy(url).await.map(Rendered::into_result)
    }

    async fn close(self) {
        self.primary.close().await;
        self.secondary.close().await;
    }
}
