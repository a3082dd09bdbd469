use crate::error::ScrapeError;
use crate::filter::OrderLinkFilterConfig;
use crate::results::OrderId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Addresses of the pages the scraper visits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteUrls {
    /// Scheme and host every path below is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    #[serde(default = "default_order_history_path")]
    pub order_history_path: String,

    /// Printable order summary; the order id is passed as `orderID`
    #[serde(default = "default_receipt_path")]
    pub receipt_path: String,
}

fn default_base_url() -> String {
    "https://www.amazon.com".to_string()
}

fn default_sign_in_path() -> String {
    "/gp/sign-in.html".to_string()
}

fn default_order_history_path() -> String {
    "/gp/css/order-history/ref=oh_surl_yo".to_string()
}

fn default_receipt_path() -> String {
    "/gp/css/summary/print.html".to_string()
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            sign_in_path: default_sign_in_path(),
            order_history_path: default_order_history_path(),
            receipt_path: default_receipt_path(),
        }
    }
}

impl SiteUrls {
    pub fn base(&self) -> Result<Url, ScrapeError> {
        Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base url {}: {e}", self.base_url)))
    }

    /// Resolve a possibly relative link against the base URL
    pub fn resolve(&self, link: &str) -> Result<Url, ScrapeError> {
        self.base()?
            .join(link)
            .map_err(|e| ScrapeError::Config(format!("cannot resolve {link}: {e}")))
    }

    pub fn sign_in_url(&self) -> Result<String, ScrapeError> {
        Ok(self.resolve(&self.sign_in_path)?.to_string())
    }

    pub fn order_history_url(&self) -> Result<String, ScrapeError> {
        Ok(self.resolve(&self.order_history_path)?.to_string())
    }

    pub fn receipt_url(&self, order_id: &OrderId) -> Result<String, ScrapeError> {
        let mut url = self.resolve(&self.receipt_path)?;
        url.query_pairs_mut().append_pair("orderID", order_id.as_str());
        Ok(url.to_string())
    }
}

/// Poll settings shared by every page object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// How long `load` waits for a page to become ready
    pub load_timeout: Duration,

    /// Pause between readiness probes
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(default_load_timeout_secs()),
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
        }
    }
}

/// Configuration for a scraping run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Directory receipts are written to; must already exist
    pub receipts_dir: PathBuf,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// chromedriver executable to launch instead of connecting to `webdriver_url`
    #[serde(default)]
    pub chromedriver_path: Option<PathBuf>,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Seconds to wait for each page to become ready
    #[serde(default = "default_load_timeout_secs")]
    pub load_timeout_secs: u64,

    /// Milliseconds between readiness probes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// List orders that need a receipt without downloading anything
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub site: SiteUrls,

    #[serde(default)]
    pub order_links: OrderLinkFilterConfig,
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_load_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl ScraperConfig {
    /// Create a new configuration with default values
    pub fn new(receipts_dir: impl Into<PathBuf>) -> Self {
        Self {
            receipts_dir: receipts_dir.into(),
            webdriver_url: default_webdriver_url(),
            chromedriver_path: None,
            headless: default_headless(),
            load_timeout_secs: default_load_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            dry_run: false,
            site: SiteUrls::default(),
            order_links: OrderLinkFilterConfig::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ScrapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ScrapeError> {
        serde_json::from_str(json).map_err(|e| ScrapeError::Config(e.to_string()))
    }

    pub fn timing(&self) -> Timing {
        Timing {
            load_timeout: Duration::from_secs(self.load_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_fills_defaults() {
        let config = ScraperConfig::from_json(r#"{ "receipts_dir": "/tmp/receipts" }"#).unwrap();
        assert_eq!(config, ScraperConfig::new("/tmp/receipts"));
        assert!(config.headless);
        assert_eq!(config.timing(), Timing::default());
    }

    #[test]
    fn test_receipts_dir_is_required() {
        let err = ScraperConfig::from_json(r#"{ "headless": false }"#).unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
    }

    #[test]
    fn test_site_urls() {
        let site = SiteUrls::default();
        assert_eq!(
            site.sign_in_url().unwrap(),
            "https://www.amazon.com/gp/sign-in.html"
        );
        assert_eq!(
            site.order_history_url().unwrap(),
            "https://www.amazon.com/gp/css/order-history/ref=oh_surl_yo"
        );
        let id = OrderId::new("111-1602829-9424211").unwrap();
        assert_eq!(
            site.receipt_url(&id).unwrap(),
            "https://www.amazon.com/gp/css/summary/print.html?orderID=111-1602829-9424211"
        );
    }

    #[test]
    fn test_alternate_storefront() {
        let config = ScraperConfig::from_json(
            r#"{ "receipts_dir": "r", "site": { "base_url": "https://www.amazon.co.uk" } }"#,
        )
        .unwrap();
        assert_eq!(
            config.site.sign_in_url().unwrap(),
            "https://www.amazon.co.uk/gp/sign-in.html"
        );
    }
}
