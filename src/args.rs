use clap::{ArgAction, Parser};
use receipt_scraper::{ScrapeError, ScraperConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "receipt-scraper")]
#[command(about = "Download order receipts from an online store account")]
#[command(version)]
pub struct Args {
    /// Account email (falls back to AP_EMAIL)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Account password (falls back to AP_PASSWORD)
    #[arg(short, long)]
    pub password: Option<String>,

    /// TOTP secret for 2-factor auth (falls back to AP_TOTP)
    #[arg(short, long)]
    pub totp: Option<String>,

    /// (Optional) Path to a chromedriver executable to launch
    #[arg(short, long)]
    pub chromedriver_path: Option<PathBuf>,

    /// Directory receipts are saved to; must already exist
    #[arg(short, long)]
    pub order_receipts_path: Option<PathBuf>,

    /// URL of a running WebDriver server (falls back to WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Run the browser without a window [default: true]
    #[arg(long, action = ArgAction::Set)]
    pub headless: Option<bool>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seconds to wait for each page to become ready
    #[arg(long)]
    pub timeout: Option<u64>,

    /// List orders missing a receipt without downloading them
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Build the run configuration from the config file (if any) and the flags
    pub fn to_config(&self) -> Result<ScraperConfig, ScrapeError> {
        let mut config = match (&self.config, &self.order_receipts_path) {
            (Some(path), _) => ScraperConfig::from_file(path)?,
            (None, Some(dir)) => ScraperConfig::new(dir),
            (None, None) => {
                return Err(ScrapeError::Config(
                    "--order-receipts-path is required without --config".to_string(),
                ));
            }
        };

        if let Some(dir) = &self.order_receipts_path {
            config.receipts_dir = dir.clone();
        }
        if let Some(path) = &self.chromedriver_path {
            config.chromedriver_path = Some(path.clone());
        }
        if let Some(timeout) = self.timeout {
            config.load_timeout_secs = timeout;
        }

        // Flag first, then the environment, then whatever the file said
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        } else if let Ok(url) = std::env::var("WEBDRIVER_URL") {
            if !url.is_empty() {
                config.webdriver_url = url;
            }
        }

        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        config.dry_run |= self.dry_run;
        Ok(config)
    }
}
