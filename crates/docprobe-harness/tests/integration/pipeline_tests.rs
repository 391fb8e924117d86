use docprobe_client::{FallbackRenderer, HttpRenderer};
use docprobe_core::inventory::build_inventory;
use docprobe_core::suite::{Outcome, TracingSuiteReporter, plan};
use docprobe_core::testutil::MockRenderer;
use docprobe_core::{BaselineMode, BaselineStore, Report, Renderer, SiteProfile, SuiteConfig, Verifier};
use docprobe_harness::{PortNegotiator, Session};

use crate::common::{Fixture, fixture, page, start_http_session};

async fn verify<R: Renderer>(
    session: &Session<R>,
    fixture: &Fixture,
    mode: BaselineMode,
) -> Report {
    let profile = SiteProfile::default();
    let inventory = build_inventory(&fixture.docs(), &profile.inventory);
    let scenarios = plan(&profile, &inventory);

    let mut baselines = BaselineStore::load(fixture.baselines()).unwrap();
    let config = SuiteConfig {
        baseline_mode: mode,
        ..SuiteConfig::default()
    };
    let report = Verifier::new(session.renderer(), session.base_url().clone(), &profile, config)
        .run(&scenarios, &mut baselines, &TracingSuiteReporter)
        .await;
    baselines.save().unwrap();
    report
}

fn failures(report: &Report) -> Vec<&str> {
    report
        .scenarios
        .iter()
        .filter(|s| !s.outcome.is_pass())
        .map(|s| s.name.as_str())
        .collect()
}

#[tokio::test]
async fn accept_then_check_passes_every_page() {
    let fixture = fixture();
    let session = start_http_session(&fixture).await;

    let accepted = verify(&session, &fixture, BaselineMode::Accept).await;
    assert_eq!(accepted.scenarios.len(), 10);
    assert!(accepted.is_success(), "{:?}", failures(&accepted));

    let stored = BaselineStore::load(fixture.baselines()).unwrap();
    assert_eq!(stored.get("/components/button/"), Some(2));
    assert_eq!(stored.get("/components/date-picker-cn/"), Some(3));
    assert_eq!(stored.len(), 4);

    let checked = verify(&session, &fixture, BaselineMode::Check).await;
    assert!(checked.is_success(), "{:?}", failures(&checked));

    session.close().await;
}

#[tokio::test]
async fn changed_table_count_fails_only_that_page() {
    let fixture = fixture();
    let session = start_http_session(&fixture).await;
    verify(&session, &fixture, BaselineMode::Accept).await;

    fixture.write_page(
        "/components/date-picker/",
        &page("DatePicker", "DatePicker", 4),
    );
    let report = verify(&session, &fixture, BaselineMode::Check).await;

    assert_eq!(failures(&report), vec!["components/date-picker [en]"]);
    match &report.get("components/date-picker [en]").unwrap().outcome {
        Outcome::Failed { reason } => {
            assert!(reason.contains("baseline 3, now 4"), "{reason}");
        }
        other => panic!("expected failure, got {other:?}"),
    }

    session.close().await;
}

#[tokio::test]
async fn missing_page_fails_with_status() {
    let fixture = fixture();
    let session = start_http_session(&fixture).await;
    verify(&session, &fixture, BaselineMode::Accept).await;

    std::fs::remove_dir_all(fixture.site().join("components/button-cn")).unwrap();
    let report = verify(&session, &fixture, BaselineMode::Check).await;

    assert_eq!(failures(&report), vec!["components/button [zh]"]);
    match &report.get("components/button [zh]").unwrap().outcome {
        Outcome::Failed { reason } => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected failure, got {other:?}"),
    }

    session.close().await;
}

#[tokio::test]
async fn broken_primary_falls_back_to_plain_fetch() {
    let fixture = fixture();
    let renderer = FallbackRenderer::new(
        MockRenderer::failing("browser crashed"),
        HttpRenderer::new().unwrap(),
    );
    let session = Session::start(&fixture.session_config(), &PortNegotiator::new(0), renderer)
        .await
        .unwrap();

    let report = verify(&session, &fixture, BaselineMode::Accept).await;
    assert!(report.is_success(), "{:?}", failures(&report));

    session.close().await;
}

#[tokio::test]
async fn unreachable_site_fails_every_scenario_without_aborting() {
    let fixture = fixture();
    let renderer = FallbackRenderer::new(
        MockRenderer::failing("browser crashed"),
        MockRenderer::failing("connection refused"),
    );
    let session = Session::start(&fixture.session_config(), &PortNegotiator::new(0), renderer)
        .await
        .unwrap();

    let report = verify(&session, &fixture, BaselineMode::Check).await;
    assert_eq!(report.scenarios.len(), 10);
    assert_eq!(report.passed(), 0);
    for scenario in &report.scenarios {
        match &scenario.outcome {
            Outcome::Failed { reason } => assert!(reason.contains("Render failed"), "{reason}"),
            other => panic!("{}: expected failure, got {other:?}", scenario.name),
        }
    }

    session.close().await;
}

#[test]
fn fixture_docs_plan_top_level_components_only() {
    let fixture = fixture();
    let profile = SiteProfile::default();
    let inventory = build_inventory(&fixture.docs(), &profile.inventory);

    let ids: Vec<&str> = inventory.iter().map(|id| id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["components/button", "components/date-picker", "components/date-picker/range"]
    );

    let names: Vec<String> = plan(&profile, &inventory)
        .iter()
        .skip(profile.fixed_pages.len())
        .map(|s| s.name(&profile))
        .collect();
    assert_eq!(
        names,
        vec![
            "components/button [zh]",
            "components/button [en]",
            "components/date-picker [zh]",
            "components/date-picker [en]",
        ]
    );
}
