pub mod offline;
pub mod webdriver;

pub use offline::OfflineSession;
pub use webdriver::{WebDriverOptions, WebDriverSession};

use crate::error::SessionError;
use async_trait::async_trait;
use std::fmt;

/// How an element is addressed on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element id attribute
    Id(String),
    /// CSS selector
    Css(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// The locator expressed as a CSS selector
    pub fn to_css(&self) -> String {
        match self {
            Locator::Id(id) => format!("#{id}"),
            Locator::Css(css) => css.clone(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// A live browser tab the page objects drive.
///
/// Implementations report `SessionError::NoSuchElement` when a locator matches
/// nothing, and `SessionError::Driver` for everything else, so callers can tell
/// "not rendered yet" apart from a broken session.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigate to `url` and wait for the document to load
    async fn goto(&self, url: &str) -> Result<(), SessionError>;

    /// URL the browser is currently at
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Succeeds if at least one element matches
    async fn find(&self, locator: &Locator) -> Result<(), SessionError>;

    /// Type `text` into the first matching element
    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), SessionError>;

    /// Click the first matching element
    async fn click(&self, locator: &Locator) -> Result<(), SessionError>;

    /// Read one attribute of the first matching element
    async fn attribute(&self, locator: &Locator, name: &str)
    -> Result<Option<String>, SessionError>;

    /// Read one attribute of every matching element, in document order
    async fn attributes(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Vec<Option<String>>, SessionError>;

    /// Full markup of the current document
    async fn source(&self) -> Result<String, SessionError>;

    /// End the session
    async fn close(&self) -> Result<(), SessionError>;
}
