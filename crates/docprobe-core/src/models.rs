use std::fmt;

use scraper::{Html, Selector};

use crate::error::ProbeError;

/// Canonical, locale- and index-independent identifier of one documentation page.
///
/// Always `/`-separated and relative to the docs root, e.g. `components/button`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of `/` separators: `components/button` has depth 1.
    pub fn depth(&self) -> usize {
        self.0.matches('/').count()
    }

    /// URL path of this page in the given locale, e.g. `/components/button-cn/`.
    pub fn url_path(&self, locale_suffix: &str) -> String {
        format!("/{}{}/", self.0, locale_suffix)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the site's two locales a scenario targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Unsuffixed URLs.
    Base,
    /// URLs carrying the site's locale marker.
    Suffixed,
}

/// Outcome of fetching one path: HTTP status plus the captured markup.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// HTTP status of the navigation; `0` when the engine could not report one.
    pub status: u16,
    pub document: Document,
}

impl RenderResult {
    pub fn new(status: u16, html: impl Into<String>) -> Self {
        Self {
            status,
            document: Document::new(html),
        }
    }
}

/// Captured page markup, queryable with CSS selectors.
///
/// Keeps the source text and parses on demand, so the value stays `Send`
/// and can cross await points.
#[derive(Debug, Clone, Default)]
pub struct Document {
    html: String,
}

impl Document {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn len(&self) -> usize {
        self.html.len()
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Whitespace-collapsed text of the first element matching `selector`.
    ///
    /// Returns an empty string when nothing matches.
    pub fn text(&self, selector: &str) -> Result<String, ProbeError> {
        let selector = parse_selector(selector)?;
        let html = self.parse();
        let text = html
            .select(&selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
        Ok(text)
    }

    /// Number of elements matching `selector`.
    pub fn count(&self, selector: &str) -> Result<usize, ProbeError> {
        let selector = parse_selector(selector)?;
        Ok(self.parse().select(&selector).count())
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ProbeError> {
    Selector::parse(selector).map_err(|_| ProbeError::SelectorError(selector.to_string()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>Button  Docs</title></head>
        <body><h1>
            Button 按钮
        </h1><main><table></table><div><table></table></div></main><table></table></body></html>"#;

    #[test]
    fn test_text_collapses_whitespace() {
        let doc = Document::new(PAGE);
        assert_eq!(doc.text("h1").unwrap(), "Button 按钮");
        assert_eq!(doc.text("title").unwrap(), "Button Docs");
    }

    #[test]
    fn test_text_missing_element_is_empty() {
        let doc = Document::new(PAGE);
        assert_eq!(doc.text("h2").unwrap(), "");
    }

    #[test]
    fn test_count_scoped_to_main() {
        let doc = Document::new(PAGE);
        assert_eq!(doc.count("main table").unwrap(), 2);
        assert_eq!(doc.count("table").unwrap(), 3);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::new(PAGE);
        let err = doc.count("main >>> table").unwrap_err();
        assert!(matches!(err, ProbeError::SelectorError(_)));
    }

    #[test]
    fn test_page_id_depth_and_url() {
        let id = PageId::new("components/button");
        assert_eq!(id.depth(), 1);
        assert_eq!(id.url_path(""), "/components/button/");
        assert_eq!(id.url_path("-cn"), "/components/button-cn/");
    }
}
