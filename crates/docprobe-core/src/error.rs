use thiserror::Error;

/// Error types shared by every docprobe crate.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP request failed (fallback fetch or server probe).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Browser launch, navigation or capture failed.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Operation timed out.
    #[error("Timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Invalid configuration (env vars, profile, regex).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A CSS selector did not parse.
    #[error("Invalid selector '{0}'")]
    SelectorError(String),

    /// A scenario check did not hold.
    #[error("{0}")]
    AssertionFailed(String),

    /// Both the primary and the fallback render strategy failed.
    #[error("Render failed for {url}: primary: {primary}; fallback: {fallback}")]
    RenderFailed {
        url: String,
        primary: String,
        fallback: String,
    },

    /// The static file server could not bind or serve.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl ProbeError {
    /// Returns true if this error should abort the whole run rather than one scenario.
    pub fn is_setup_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::ServerError(_) | ProbeError::ConfigError(_) | ProbeError::BrowserError(_)
        )
    }
}
