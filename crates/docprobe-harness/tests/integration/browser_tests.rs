//! Needs a local Chrome/Chromium:
//!   cargo test -p docprobe-harness --features browser -- --ignored

#[cfg(feature = "browser")]
mod chromium {
    use std::time::Duration;

    use docprobe_client::{BrowserRenderer, FallbackRenderer, HttpRenderer, Rendered};
    use docprobe_core::inventory::build_inventory;
    use docprobe_core::suite::{TracingSuiteReporter, plan};
    use docprobe_core::{BaselineMode, BaselineStore, RenderConfig, SiteProfile, SuiteConfig, Verifier};
    use docprobe_harness::{PortNegotiator, Session};

    use crate::common::fixture;

    #[tokio::test]
    #[ignore]
    async fn browser_renders_fixture_site() {
        let fixture = fixture();
        let config = RenderConfig {
            settle_delay: std::time::Duration::from_millis(200),
            ..RenderConfig::default()
        };
        let renderer = FallbackRenderer::new(
            BrowserRenderer::launch(config).await.unwrap(),
            HttpRenderer::new().unwrap(),
        );
        let session = Session::start(&fixture.session_config(), &PortNegotiator::new(0), renderer)
            .await
            .unwrap();

        let profile = SiteProfile::default();
        let scenarios = plan(&profile, &build_inventory(&fixture.docs(), &profile.inventory));
        let mut baselines = BaselineStore::in_memory();
        let suite = SuiteConfig {
            baseline_mode: BaselineMode::Accept,
            ..SuiteConfig::default()
        };

        let report = session
            .scoped(async |session| {
                Verifier::new(session.renderer(), session.base_url().clone(), &profile, suite.clone())
                    .run(&scenarios, &mut baselines, &TracingSuiteReporter)
                    .await
            })
            .await;

        assert!(report.is_success(), "{report:#?}");
        assert_eq!(baselines.get("/components/date-picker/"), Some(3));
    }

    /// Never answers, so any `<img>` pointing here keeps `load` from firing.
    async fn stall() -> &'static str {
        std::future::pending().await
    }

    #[tokio::test]
    #[ignore]
    async fn stalled_subresource_still_renders_in_browser() {
        let fixture = fixture();
        let stalled = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let stalled_addr = stalled.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(stalled, axum::Router::new().fallback(stall)).await });

        fixture.write_page(
            "/slow/",
            &format!(
                "<!doctype html><html><head><title>Slow</title></head><body><h1>Slow</h1>\
                 <main><table></table></main><img src=\"http://{stalled_addr}/pixel.png\"></body></html>"
            ),
        );

        let config = RenderConfig {
            navigation_timeout: Duration::from_secs(5),
            settle_delay: Duration::from_millis(100),
            selector_timeout: Duration::from_millis(500),
            ..RenderConfig::default()
        };
        let renderer = FallbackRenderer::new(
            BrowserRenderer::launch(config).await.unwrap(),
            HttpRenderer::new().unwrap(),
        );
        let session = Session::start(&fixture.session_config(), &PortNegotiator::new(0), renderer)
            .await
            .unwrap();

        let rendered = session
            .scoped(async |session| {
                let url = session.base_url().join("/slow/").unwrap();
                session.renderer().render_with_strategy(url.as_str()).await.unwrap()
            })
            .await;

        assert!(matches!(rendered, Rendered::Primary(_)), "{rendered:?}");
        assert_eq!(rendered.result().status, 200);
        assert_eq!(rendered.result().document.count("main table").unwrap(), 1);
    }
}
