/// Smoke-test for `BrowserRenderer` with the HTTP fallback.
///
/// Launches a headless Chromium, renders <https://example.com>, and verifies
/// the status and the rendered `<h1>`.
///
/// Run with:
///   cargo run --example browser_smoke --features browser
use docprobe_client::{BrowserRenderer, FallbackRenderer, HttpRenderer};
use docprobe_core::{RenderConfig, Renderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching headless browser…");
    let config = RenderConfig {
        wait_selector: None,
        ..RenderConfig::default()
    };
    let renderer = FallbackRenderer::new(BrowserRenderer::launch(config).await?, HttpRenderer::new()?);

    let url = "https://example.com";
    println!("Rendering {url} …");
    let rendered = renderer.render_with_strategy(url).await?;
    let result = rendered.result();
    let heading = result.document.text("h1")?;

    assert_eq!(result.status, 200, "unexpected status");
    assert_eq!(heading, "Example Domain", "expected <h1> not found");

    println!(
        "OK: status {}, {} bytes, fallback used: {}",
        result.status,
        result.document.len(),
        rendered.used_fallback()
    );
    renderer.close().await;
    Ok(())
}
