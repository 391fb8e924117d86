//! Test utilities: a scripted [`Renderer`] for unit tests.
//!
//! Handwritten mock for dependency injection. Uses `Arc<Mutex<_>>` for
//! interior mutability so tests can assert on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::ProbeError;
use crate::models::RenderResult;
use crate::traits::Renderer;

#[derive(Clone)]
enum MockPage {
    Page { status: u16, html: String },
    Failure(String),
}

/// Mock renderer answering by URL path.
///
/// Unknown paths render as an empty 404 page, like a static server would.
#[derive(Clone, Default)]
pub struct MockRenderer {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, path: &str, status: u16, html: &str) -> Self {
        self.pages.lock().unwrap().insert(
            path.to_string(),
            MockPage::Page {
                status,
                html: html.to_string(),
            },
        );
        self
    }

    /// Every render of `path` fails with an HTTP error carrying `message`.
    pub fn with_failure(self, path: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), MockPage::Failure(message.to_string()));
        self
    }

    /// Every render of any path fails.
    pub fn failing(message: &str) -> Self {
        Self::new().with_failure("*", message)
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Paths rendered so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for MockRenderer {
    async fn render(&self, url: &str) -> Result<RenderResult, ProbeError> {
        let path = url::Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string());
        self.calls.lock().unwrap().push(path.clone());

        let page = {
            let pages = self.pages.lock().unwrap();
            pages.get(&path).or_else(|| pages.get("*")).cloned()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match page {
            Some(MockPage::Page { status, html }) => Ok(RenderResult::new(status, html)),
            Some(MockPage::Failure(message)) => Err(ProbeError::HttpError(message)),
            None => Ok(RenderResult::new(404, "")),
        }
    }
}
