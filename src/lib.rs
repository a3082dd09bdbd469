// Re-export modules
pub mod collector;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod flow;
pub mod pages;
pub mod receipts;
pub mod results;
pub mod session;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use credentials::Credentials;
pub use error::{ScrapeError, SessionError};
pub use results::{OrderId, RunSummary};

use session::{BrowserSession, WebDriverOptions, WebDriverSession};
use std::path::PathBuf;

/// Builder for a receipt scraping run against a real browser
pub struct ReceiptScraper {
    config: ScraperConfig,
}

impl ReceiptScraper {
    /// Create a new builder from a base configuration
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Override the WebDriver URL
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Launch chromedriver from this path instead of connecting to a running server
    pub fn with_chromedriver_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chromedriver_path = Some(path.into());
        self
    }

    /// Show or hide the browser window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Set how long each page may take to become ready
    pub fn with_load_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.load_timeout_secs = timeout_seconds;
        self
    }

    /// Only report which receipts are missing
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Open a browser, run the whole flow and close the browser again
    pub async fn run(self, credentials: &Credentials) -> Result<RunSummary, ScrapeError> {
        // Fail on a bad receipts directory before starting a browser
        receipts::ReceiptStore::open(&self.config.receipts_dir)?;

        let options = WebDriverOptions {
            webdriver_url: self.config.webdriver_url.clone(),
            chromedriver_path: self.config.chromedriver_path.clone(),
            headless: self.config.headless,
        };
        let session = WebDriverSession::connect(&options).await?;

        let result = flow::scrape_receipts(&session, credentials, &self.config).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        result
    }
}
