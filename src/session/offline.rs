//! In-memory browser session.
//!
//! Serves a fixed set of HTML documents keyed by URL and answers element
//! lookups by running CSS selectors over the stored markup. Clicks follow
//! scripted transitions, which is enough to replay a captured sign-in flow or
//! a paginated order history without a real browser.

use crate::error::SessionError;
use crate::session::{BrowserSession, Locator};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

const BLANK_DOCUMENT: &str = "<html><head></head><body></body></html>";

#[derive(Debug, Default)]
struct State {
    current_url: String,
    visits: Vec<String>,
    typed: Vec<(String, String)>,
    clicks: Vec<String>,
}

/// Browser session over canned documents
#[derive(Debug, Default)]
pub struct OfflineSession {
    documents: HashMap<String, String>,
    transitions: HashMap<(String, String), String>,
    state: Mutex<State>,
}

impl OfflineSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` when the browser navigates to `url`
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.documents.insert(url.into(), html.into());
        self
    }

    /// Navigate to `to` when `locator` is clicked while at `from`
    pub fn with_transition(
        mut self,
        from: impl Into<String>,
        locator: &Locator,
        to: impl Into<String>,
    ) -> Self {
        self.transitions
            .insert((from.into(), locator.to_css()), to.into());
        self
    }

    /// Every URL navigated to, in order (clicks included)
    pub fn visits(&self) -> Vec<String> {
        self.state().visits.clone()
    }

    /// Text typed into fields as `(selector, text)` pairs
    pub fn typed(&self) -> Vec<(String, String)> {
        self.state().typed.clone()
    }

    /// Selectors of every clicked element
    pub fn clicks(&self) -> Vec<String> {
        self.state().clicks.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_document(&self) -> String {
        let url = self.state().current_url.clone();
        self.documents
            .get(&url)
            .cloned()
            .unwrap_or_else(|| BLANK_DOCUMENT.to_string())
    }

    fn navigate(&self, url: &str) {
        let mut state = self.state();
        state.current_url = url.to_string();
        state.visits.push(url.to_string());
    }
}

/// Attribute `name` of every element matching `locator`
fn select_attributes(
    html: &str,
    locator: &Locator,
    name: &str,
) -> Result<Vec<Option<String>>, SessionError> {
    let css = locator.to_css();
    let selector = Selector::parse(&css)
        .map_err(|e| SessionError::Driver(format!("invalid selector {css}: {e:?}")))?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|element| element.value().attr(name).map(str::to_string))
        .collect())
}

fn require_match(html: &str, locator: &Locator) -> Result<(), SessionError> {
    if select_attributes(html, locator, "id")?.is_empty() {
        Err(SessionError::NoSuchElement(locator.to_string()))
    } else {
        Ok(())
    }
}

#[async_trait]
impl BrowserSession for OfflineSession {
    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        self.navigate(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.state().current_url.clone())
    }

    async fn find(&self, locator: &Locator) -> Result<(), SessionError> {
        require_match(&self.current_document(), locator)
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), SessionError> {
        require_match(&self.current_document(), locator)?;
        self.state()
            .typed
            .push((locator.to_css(), text.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<(), SessionError> {
        require_match(&self.current_document(), locator)?;
        let from = {
            let mut state = self.state();
            state.clicks.push(locator.to_css());
            state.current_url.clone()
        };
        if let Some(to) = self.transitions.get(&(from, locator.to_css())) {
            self.navigate(to);
        }
        Ok(())
    }

    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        select_attributes(&self.current_document(), locator, name)?
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::NoSuchElement(locator.to_string()))
    }

    async fn attributes(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Vec<Option<String>>, SessionError> {
        select_attributes(&self.current_document(), locator, name)
    }

    async fn source(&self) -> Result<String, SessionError> {
        Ok(self.current_document())
    }

    async fn close(&self) -> Result<(), SessionError> {
        Ok(())
    }
}
