use std::path::Path;

use regex::Regex;

use crate::error::ProbeError;
use crate::inventory::InventoryConfig;
use crate::models::Locale;

/// A page verified by a fixed scenario rather than discovered from sources.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FixedPage {
    /// Display name, e.g. "Overview".
    pub name: String,
    pub locale: Locale,
    /// URL path served by the site, e.g. `/components/overview`.
    pub path: String,
    /// Element whose text is checked (`title`, `h1`).
    pub selector: String,
    /// Regex the element's text must match when it is non-empty.
    pub expected: String,
}

impl FixedPage {
    fn new(name: &str, locale: Locale, path: &str, selector: &str, expected: &str) -> Self {
        Self {
            name: name.into(),
            locale,
            path: path.into(),
            selector: selector.into(),
            expected: expected.into(),
        }
    }

    pub fn pattern(&self) -> Result<Regex, ProbeError> {
        Regex::new(&self.expected).map_err(|e| {
            ProbeError::ConfigError(format!("Invalid pattern for {}: {e}", self.name))
        })
    }
}

/// The expected shape of the documentation site.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Marker appended to URLs of the suffixed locale.
    pub locale_suffix: String,
    pub base_label: String,
    pub suffixed_label: String,
    pub heading_selector: String,
    /// Tables counted against the baseline store.
    pub table_selector: String,
    /// Component pages with this many `/` separators or more are not verified.
    pub max_component_depth: usize,
    pub expected_status: u16,
    pub fixed_pages: Vec<FixedPage>,
    pub inventory: InventoryConfig,
}

impl Default for SiteProfile {
    fn default() -> Self {
        use Locale::{Base, Suffixed};

        Self {
            locale_suffix: "-cn".into(),
            base_label: "en".into(),
            suffixed_label: "zh".into(),
            heading_selector: "h1".into(),
            table_selector: "main table".into(),
            max_component_depth: 2,
            expected_status: 200,
            fixed_pages: vec![
                FixedPage::new("Home", Base, "/", "title", "(?i)design"),
                FixedPage::new("Home", Suffixed, "/index-cn", "title", "(?i)design|设计"),
                FixedPage::new("Overview", Base, "/components/overview", "h1", "(?i)overview"),
                FixedPage::new("Overview", Suffixed, "/components/overview-cn", "h1", "概览|(?i)overview"),
                FixedPage::new("Resources", Base, "/resources", "h1", "(?i)resources"),
                FixedPage::new("Resources", Suffixed, "/resources-cn", "h1", "资源|(?i)resources"),
            ],
            inventory: InventoryConfig::default(),
        }
    }
}

impl SiteProfile {
    /// Load a profile from JSON; omitted fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ProbeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::ConfigError(format!("Failed to read profile {}: {e}", path.display()))
        })?;
        let profile: Self = serde_json::from_str(&raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reject patterns and selectors that would fail every scenario using them.
    pub fn validate(&self) -> Result<(), ProbeError> {
        for page in &self.fixed_pages {
            page.pattern()?;
            scraper::Selector::parse(&page.selector)
                .map_err(|_| ProbeError::SelectorError(page.selector.clone()))?;
        }
        for selector in [&self.heading_selector, &self.table_selector] {
            scraper::Selector::parse(selector)
                .map_err(|_| ProbeError::SelectorError(selector.clone()))?;
        }
        if self.max_component_depth == 0 {
            return Err(ProbeError::ConfigError(
                "max_component_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn label(&self, locale: Locale) -> &str {
        match locale {
            Locale::Base => &self.base_label,
            Locale::Suffixed => &self.suffixed_label,
        }
    }

    pub fn suffix(&self, locale: Locale) -> &str {
        match locale {
            Locale::Base => "",
            Locale::Suffixed => &self.locale_suffix,
        }
    }
}
