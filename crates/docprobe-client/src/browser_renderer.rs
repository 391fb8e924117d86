use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use docprobe_core::config::RenderConfig;
use docprobe_core::error::ProbeError;
use docprobe_core::models::RenderResult;
use docprobe_core::traits::Renderer;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::polyfill::PolyfillSet;

const SELECTOR_POLL: Duration = Duration::from_millis(100);
const NAVIGATION_POLL: Duration = Duration::from_millis(50);

/// Set on the outgoing document right before navigating; the next document
/// starts without it.
const NAVIGATION_MARKER: &str = "__docprobeNavigating";

/// `pending` until a new document has been parsed, then `ready`, or `error`
/// when Chromium replaced the page with its own network-error page.
const DOCUMENT_STATE_JS: &str = r#"(() => {
    if (window.__docprobeNavigating === true) return 'pending';
    if (location.protocol === 'chrome-error:') return 'error';
    return document.readyState === 'loading' ? 'pending' : 'ready';
})()"#;

/// HTTP status of the current document, or 0 when the engine does not expose it.
const NAVIGATION_STATUS_JS: &str = r#"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && typeof entry.responseStatus === 'number' ? entry.responseStatus : 0;
})()"#;

/// Headless-browser renderer using Chromium via the Chrome DevTools Protocol.
///
/// Renders client-side JavaScript before capturing the markup, which the
/// documentation site needs since it is a single-page application.
///
/// One Chromium process and one tab serve every [`Renderer::render`] call;
/// each call navigates that tab, so calls must not overlap.
///
/// # Example
///
/// ```rust,no_run
/// use docprobe_client::BrowserRenderer;
/// use docprobe_core::{RenderConfig, Renderer};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let renderer = BrowserRenderer::launch(RenderConfig::default()).await?;
/// let result = renderer.render("http://127.0.0.1:8080/").await?;
/// println!("{} {}", result.status, result.document.text("title")?);
/// renderer.close().await;
/// # Ok(())
/// # }
/// ```
pub struct BrowserRenderer {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    config: RenderConfig,
}

impl BrowserRenderer {
    /// Launches a headless Chromium with every polyfill installed.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH` (or the
    /// default locations checked by `chromiumoxide`).
    pub async fn launch(config: RenderConfig) -> Result<Self, ProbeError> {
        Self::launch_with(config, PolyfillSet::default()).await
    }

    /// Launches a headless Chromium with a custom polyfill selection.
    pub async fn launch_with(config: RenderConfig, polyfills: PolyfillSet) -> Result<Self, ProbeError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        // Snap-packaged Chromium exposes a wrapper that rejects standard
        // Chrome CLI flags, so prefer the real binary when one is found.
        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let browser_config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| ProbeError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ProbeError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProbeError::BrowserError(format!("Failed to open tab: {e}")))?;

        let script = polyfills.script();
        if !script.is_empty() {
            page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(script))
                .await
                .map_err(|e| ProbeError::BrowserError(format!("Failed to install polyfills: {e}")))?;
        }

        Ok(Self {
            browser,
            page,
            handler,
            config,
        })
    }

    /// Tries to locate the real Chrome/Chromium binary.
    ///
    /// `CHROME_BIN` wins when it points at an existing file; otherwise the
    /// snap-internal binary and well-known system paths are checked. `None`
    /// lets `chromiumoxide` do its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        let candidates: &[&str] = &[
            // Snap (Ubuntu default)
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            // Flatpak
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            // Common apt / manual installs
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];

        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Navigate the shared tab and wait until the new document is parsed.
    ///
    /// `Page::goto` waits for the `load` event, which a single stalled image
    /// or script can hold back indefinitely. The navigation is started from
    /// the page instead and only DOM construction is awaited.
    async fn navigate(&self, url: &str) -> Result<(), ProbeError> {
        self.page
            .evaluate(navigation_script(url)?)
            .await
            .map_err(|e| ProbeError::BrowserError(format!("Failed to navigate to {url}: {e}")))?;

        let timeout = self.config.navigation_timeout;
        let deadline = Instant::now() + timeout;
        loop {
            match self.document_state().await.as_deref() {
                Some("ready") => return Ok(()),
                Some("error") => {
                    return Err(ProbeError::BrowserError(format!(
                        "Failed to navigate to {url}: browser error page"
                    )));
                }
                _ => {}
            }
            if Instant::now() >= deadline {
                return Err(ProbeError::Timeout(timeout.as_secs()));
            }
            tokio::time::sleep(NAVIGATION_POLL).await;
        }
    }

    /// `None` while the execution context is being swapped mid-navigation.
    async fn document_state(&self) -> Option<String> {
        self.page
            .evaluate(DOCUMENT_STATE_JS)
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok())
    }

    /// Poll for `selector` until it matches or the selector timeout passes.
    async fn wait_for_selector(&self, selector: &str) -> bool {
        let deadline = Instant::now() + self.config.selector_timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }

    async fn navigation_status(&self) -> u16 {
        match self.page.evaluate(NAVIGATION_STATUS_JS).await {
            Ok(result) => result.into_value::<u16>().unwrap_or(0),
            Err(e) => {
                tracing::debug!("Navigation status unavailable: {e}");
                0
            }
        }
    }
}

/// Script marking the current document and sending the tab to `url`.
fn navigation_script(url: &str) -> Result<String, ProbeError> {
    let target = serde_json::to_string(url)?;
    Ok(format!(
        "window.{NAVIGATION_MARKER} = true; window.location.assign({target});"
    ))
}

impl Renderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, ProbeError> {
        self.navigate(url).await?;

        // Client-side rendering keeps filling the DOM after navigation.
        tokio::time::sleep(self.config.settle_delay).await;

        if let Some(selector) = &self.config.wait_selector {
            if !self.wait_for_selector(selector).await {
                tracing::debug!(%url, %selector, "Selector not found, capturing anyway");
            }
        }

        let html = self
            .page
            .content()
            .await
            .map_err(|e| ProbeError::BrowserError(format!("Failed to read page content: {e}")))?;
        let status = self.navigation_status().await;

        tracing::debug!(%url, %status, bytes = html.len(), "Rendered page in browser");
        Ok(RenderResult::new(status, html))
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to reap browser process: {e}");
        }
        self.handler.abort();
    }
}
