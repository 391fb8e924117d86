use std::time::Duration;

use crate::baseline::BaselineMode;
use crate::error::ProbeError;
use crate::models::parse_selector;

/// Timing knobs for rendering one page.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Upper bound for a navigation to reach document construction.
    pub navigation_timeout: Duration,
    /// Fixed wait after navigation so client-side rendering can finish.
    pub settle_delay: Duration,
    /// Upper bound for the best-effort wait on `wait_selector`.
    pub selector_timeout: Duration,
    /// Structural element worth waiting for; absence is tolerated.
    pub wait_selector: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(2000),
            selector_timeout: Duration::from_millis(5000),
            wait_selector: Some("main table".into()),
        }
    }
}

impl RenderConfig {
    /// Reject settings that would fail every render.
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.navigation_timeout < Duration::from_secs(1) {
            return Err(ProbeError::ConfigError(
                "navigation timeout must be at least 1 second".into(),
            ));
        }
        if let Some(selector) = &self.wait_selector {
            parse_selector(selector).map_err(|_| {
                ProbeError::ConfigError(format!("Invalid wait selector '{selector}'"))
            })?;
        }
        Ok(())
    }
}

/// Settings for one verification run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Ceiling for a whole scenario, render included.
    pub scenario_timeout: Duration,
    pub baseline_mode: BaselineMode,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            scenario_timeout: Duration::from_secs(60),
            baseline_mode: BaselineMode::Check,
        }
    }
}

impl SuiteConfig {
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.scenario_timeout < Duration::from_secs(1) {
            return Err(ProbeError::ConfigError(
                "scenario timeout must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}
