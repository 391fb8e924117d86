//! Verification pipeline: plans scenarios from the site profile and the page
//! inventory, then runs them one after another against a [`Renderer`].
//!
//! Scenarios share the renderer (one browser tab) and must not overlap, so
//! [`Verifier::run`] awaits each scenario before starting the next. A failed
//! or timed-out scenario never affects its siblings.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use url::Url;

use crate::baseline::BaselineStore;
use crate::check::{self, TextCheck};
use crate::config::SuiteConfig;
use crate::error::ProbeError;
use crate::inventory::top_level;
use crate::models::{Locale, PageId};
use crate::naming::component_name;
use crate::profile::{FixedPage, SiteProfile};
use crate::traits::Renderer;

/// One independent verification.
#[derive(Debug, Clone)]
pub enum Scenario {
    /// Home, overview, resources and similar pages listed in the profile.
    Fixed(FixedPage),
    /// A discovered component page in one locale.
    Component { id: PageId, locale: Locale },
}

impl Scenario {
    /// Display name, e.g. `Overview [en]` or `components/button [zh]`.
    pub fn name(&self, profile: &SiteProfile) -> String {
        match self {
            Scenario::Fixed(page) => format!("{} [{}]", page.name, profile.label(page.locale)),
            Scenario::Component { id, locale } => format!("{id} [{}]", profile.label(*locale)),
        }
    }

    /// URL path rendered by this scenario.
    pub fn path(&self, profile: &SiteProfile) -> String {
        match self {
            Scenario::Fixed(page) => page.path.clone(),
            Scenario::Component { id, locale } => id.url_path(profile.suffix(*locale)),
        }
    }
}

/// Build the scenario list: fixed pages first, then each top-level component
/// in the suffixed and the base locale.
pub fn plan(profile: &SiteProfile, inventory: &[PageId]) -> Vec<Scenario> {
    let mut scenarios: Vec<Scenario> = profile
        .fixed_pages
        .iter()
        .cloned()
        .map(Scenario::Fixed)
        .collect();

    for id in top_level(inventory, profile.max_component_depth) {
        for locale in [Locale::Suffixed, Locale::Base] {
            scenarios.push(Scenario::Component {
                id: id.clone(),
                locale,
            });
        }
    }

    scenarios
}

/// Final state of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed { notes: Vec<String> },
    Failed { reason: String },
    TimedOut { after_secs: u64 },
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Passed { .. })
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub path: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Results of a whole run, in execution order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub base_url: String,
    pub scenarios: Vec<ScenarioReport>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.outcome.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn get(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

/// Events emitted while a suite runs.
#[derive(Debug, Clone)]
pub enum SuiteEvent<'a> {
    Started { scenarios: usize, base_url: &'a str },
    ScenarioStarted { name: &'a str, url: &'a str },
    ScenarioFinished { report: &'a ScenarioReport },
    Finished { passed: usize, failed: usize },
}

/// Receives suite events (decoupled logging).
pub trait SuiteReporter: Send + Sync {
    fn report(&self, event: SuiteEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSuiteReporter;

impl SuiteReporter for TracingSuiteReporter {
    fn report(&self, event: SuiteEvent<'_>) {
        match event {
            SuiteEvent::Started {
                scenarios,
                base_url,
            } => {
                tracing::info!(%scenarios, %base_url, "Verification started");
            }
            SuiteEvent::ScenarioStarted { name, url } => {
                tracing::debug!(%name, %url, "Scenario started");
            }
            SuiteEvent::ScenarioFinished { report } => match &report.outcome {
                Outcome::Passed { .. } => {
                    tracing::info!(name = %report.name, ms = report.duration_ms, "PASS");
                }
                Outcome::Failed { reason } => {
                    tracing::warn!(name = %report.name, %reason, "FAIL");
                }
                Outcome::TimedOut { after_secs } => {
                    tracing::warn!(name = %report.name, %after_secs, "TIMEOUT");
                }
            },
            SuiteEvent::Finished { passed, failed } => {
                tracing::info!(%passed, %failed, "Verification finished");
            }
        }
    }
}

/// Runs scenarios against a renderer bound to one served site.
pub struct Verifier<'a, R: Renderer> {
    renderer: &'a R,
    base_url: Url,
    profile: &'a SiteProfile,
    config: SuiteConfig,
}

impl<'a, R: Renderer> Verifier<'a, R> {
    pub fn new(renderer: &'a R, base_url: Url, profile: &'a SiteProfile, config: SuiteConfig) -> Self {
        Self {
            renderer,
            base_url,
            profile,
            config,
        }
    }

    /// Run every scenario in order and collect the report.
    ///
    /// In accept mode the baseline store is updated in place; saving it is
    /// left to the caller.
    pub async fn run(
        &self,
        scenarios: &[Scenario],
        baselines: &mut BaselineStore,
        reporter: &dyn SuiteReporter,
    ) -> Report {
        let started_at = Utc::now();
        reporter.report(SuiteEvent::Started {
            scenarios: scenarios.len(),
            base_url: self.base_url.as_str(),
        });

        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let report = self.run_scenario(scenario, baselines, reporter).await;
            reporter.report(SuiteEvent::ScenarioFinished { report: &report });
            reports.push(report);
        }

        let report = Report {
            started_at,
            base_url: self.base_url.to_string(),
            scenarios: reports,
        };
        reporter.report(SuiteEvent::Finished {
            passed: report.passed(),
            failed: report.failed(),
        });
        report
    }

    /// Run a single scenario under the per-scenario timeout.
    pub async fn run_scenario(
        &self,
        scenario: &Scenario,
        baselines: &mut BaselineStore,
        reporter: &dyn SuiteReporter,
    ) -> ScenarioReport {
        let name = scenario.name(self.profile);
        let path = scenario.path(self.profile);
        let start = Instant::now();

        let outcome = match self.url(&path) {
            Err(e) => Outcome::Failed {
                reason: e.to_string(),
            },
            Ok(url) => {
                reporter.report(SuiteEvent::ScenarioStarted {
                    name: &name,
                    url: &url,
                });
                let verify = async {
                    match scenario {
                        Scenario::Fixed(page) => self.verify_fixed(page, &url).await,
                        Scenario::Component { id, locale } => {
                            self.verify_component(id, *locale, &path, &url, baselines)
                                .await
                        }
                    }
                };
                match tokio::time::timeout(self.config.scenario_timeout, verify).await {
                    Ok(Ok(notes)) => Outcome::Passed { notes },
                    Ok(Err(e)) => Outcome::Failed {
                        reason: e.to_string(),
                    },
                    Err(_) => Outcome::TimedOut {
                        after_secs: self.config.scenario_timeout.as_secs(),
                    },
                }
            }
        };

        ScenarioReport {
            name,
            path,
            outcome,
            duration_ms: duration_ms(start.elapsed()),
        }
    }

    fn url(&self, path: &str) -> Result<String, ProbeError> {
        self.base_url
            .join(path)
            .map(String::from)
            .map_err(|e| ProbeError::ConfigError(format!("Invalid page path '{path}': {e}")))
    }

    async fn verify_fixed(&self, page: &FixedPage, url: &str) -> Result<Vec<String>, ProbeError> {
        let pattern = page.pattern()?;
        let result = self.renderer.render(url).await?;
        check::expect_status(result.status, self.profile.expected_status)?;

        let text = result.document.text(&page.selector)?;
        let mut notes = Vec::new();
        if check::expect_match_if_present(&text, &pattern, &page.selector)? == TextCheck::Skipped {
            notes.push(format!("<{}> empty, text check skipped", page.selector));
        }
        Ok(notes)
    }

    async fn verify_component(
        &self,
        id: &PageId,
        locale: Locale,
        path: &str,
        url: &str,
        baselines: &mut BaselineStore,
    ) -> Result<Vec<String>, ProbeError> {
        let result = self.renderer.render(url).await?;
        check::expect_status(result.status, self.profile.expected_status)?;

        let mut notes = Vec::new();
        let expected_name = component_name(
            &format!("{}{}", id.as_str(), self.profile.suffix(locale)),
            &self.profile.locale_suffix,
        );
        let heading = result.document.text(&self.profile.heading_selector)?;
        if check::expect_contains_if_present(&heading, &expected_name, &self.profile.heading_selector)?
            == TextCheck::Skipped
        {
            notes.push(format!(
                "<{}> empty, heading check skipped",
                self.profile.heading_selector
            ));
        }

        let tables = result.document.count(&self.profile.table_selector)?;
        tracing::info!(page = %path, %tables, "Counted tables");
        notes.push(check::expect_baseline(
            baselines,
            path,
            tables,
            self.config.baseline_mode,
        )?);

        Ok(notes)
    }
}

fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
