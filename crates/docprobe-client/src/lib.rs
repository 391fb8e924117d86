pub mod fallback;
pub mod fetcher;
pub mod polyfill;

#[cfg(feature = "browser")]
pub mod browser_renderer;

#[cfg(feature = "browser")]
pub use browser_renderer::BrowserRenderer;
pub use fallback::{FallbackRenderer, Rendered};
pub use fetcher::HttpRenderer;
pub use polyfill::PolyfillSet;
