use crate::error::SessionError;
use crate::session::{BrowserSession, Locator};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Port used when we launch chromedriver ourselves
const CHROMEDRIVER_PORT: u16 = 9515;

/// Endpoints tried when the configured WebDriver URL refuses connections
const FALLBACK_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
];

/// How to reach (or start) a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverOptions {
    /// URL of an already running WebDriver server
    pub webdriver_url: String,

    /// chromedriver executable to launch instead of connecting to `webdriver_url`
    pub chromedriver_path: Option<PathBuf>,

    /// Run Chrome without a window
    pub headless: bool,
}

/// Browser session backed by a fantoccini WebDriver client
pub struct WebDriverSession {
    client: Client,
    // Held so the spawned chromedriver lives as long as the session
    _driver: Option<Child>,
}

impl WebDriverSession {
    /// Connect to a WebDriver server, launching chromedriver first if a path is given
    pub async fn connect(options: &WebDriverOptions) -> Result<Self, SessionError> {
        let capabilities = chrome_capabilities(options.headless);

        if let Some(path) = &options.chromedriver_path {
            let driver = spawn_chromedriver(path)?;
            let url = format!("http://localhost:{CHROMEDRIVER_PORT}");
            let client = connect_when_ready(&url, &capabilities).await?;
            return Ok(Self {
                client,
                _driver: Some(driver),
            });
        }

        match connect(&options.webdriver_url, &capabilities).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", options.webdriver_url);
                return Ok(Self {
                    client,
                    _driver: None,
                });
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    options.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_URLS {
            if url == options.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = connect(url, &capabilities).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self {
                    client,
                    _driver: None,
                });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Driver(format!(
            "could not connect to any WebDriver server (tried {})",
            options.webdriver_url
        )))
    }

    async fn element(
        &self,
        locator: &Locator,
    ) -> Result<fantoccini::elements::Element, SessionError> {
        self.client
            .find(to_fantoccini(locator))
            .await
            .map_err(|e| map_cmd_error(e, locator))
    }
}

fn chrome_capabilities(headless: bool) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec!["--disable-gpu", "--window-size=1280,1024"];
    if headless {
        args.push("--headless=new");
    }

    let mut capabilities = serde_json::Map::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    capabilities
}

async fn connect(
    url: &str,
    capabilities: &serde_json::Map<String, serde_json::Value>,
) -> Result<Client, SessionError> {
    ClientBuilder::native()
        .capabilities(capabilities.clone())
        .connect(url)
        .await
        .map_err(|e| SessionError::Driver(e.to_string()))
}

fn spawn_chromedriver(path: &Path) -> Result<Child, SessionError> {
    ::log::info!("Starting chromedriver from {}", path.display());
    Command::new(path)
        .arg(format!("--port={CHROMEDRIVER_PORT}"))
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| SessionError::Driver(format!("failed to start {}: {e}", path.display())))
}

/// A freshly spawned chromedriver needs a moment before it accepts sessions
async fn connect_when_ready(
    url: &str,
    capabilities: &serde_json::Map<String, serde_json::Value>,
) -> Result<Client, SessionError> {
    let mut last_error = None;
    for attempt in 0..20 {
        match connect(url, capabilities).await {
            Ok(client) => return Ok(client),
            Err(e) => {
                ::log::trace!("chromedriver not ready (attempt {}): {}", attempt + 1, e);
                last_error = Some(e);
                tokio::time::sleep(Duration::from_millis(250)).await;
            }
        }
    }
    Err(last_error.unwrap_or_else(|| SessionError::Driver("chromedriver never started".into())))
}

fn to_fantoccini(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Id(id) => fantoccini::Locator::Id(id),
        Locator::Css(css) => fantoccini::Locator::Css(css),
    }
}

fn map_cmd_error(error: CmdError, locator: &Locator) -> SessionError {
    if error.is_no_such_element() {
        SessionError::NoSuchElement(locator.to_string())
    } else {
        SessionError::Driver(error.to_string())
    }
}

fn driver_error(error: CmdError) -> SessionError {
    SessionError::Driver(error.to_string())
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&self, url: &str) -> Result<(), SessionError> {
        ::log::debug!("GOTO: {}", url);
        self.client.goto(url).await.map_err(driver_error)
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(driver_error)
    }

    async fn find(&self, locator: &Locator) -> Result<(), SessionError> {
        self.element(locator).await.map(|_| ())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), SessionError> {
        let element = self.element(locator).await?;
        element
            .send_keys(text)
            .await
            .map_err(|e| map_cmd_error(e, locator))
    }

    async fn click(&self, locator: &Locator) -> Result<(), SessionError> {
        let element = self.element(locator).await?;
        element.click().await.map_err(|e| map_cmd_error(e, locator))
    }

    async fn attribute(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let element = self.element(locator).await?;
        element.attr(name).await.map_err(|e| map_cmd_error(e, locator))
    }

    async fn attributes(
        &self,
        locator: &Locator,
        name: &str,
    ) -> Result<Vec<Option<String>>, SessionError> {
        let elements = self
            .client
            .find_all(to_fantoccini(locator))
            .await
            .map_err(|e| map_cmd_error(e, locator))?;

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(element.attr(name).await.map_err(|e| map_cmd_error(e, locator))?);
        }
        Ok(values)
    }

    async fn source(&self) -> Result<String, SessionError> {
        self.client.source().await.map_err(driver_error)
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.client.clone().close().await.map_err(driver_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantoccini::error::{ErrorStatus, WebDriver};

    #[test]
    fn test_missing_element_is_told_apart_from_driver_errors() {
        let locator = Locator::id("ap_password");

        let missing = CmdError::Standard(WebDriver::new(
            ErrorStatus::NoSuchElement,
            "no such element: Unable to locate element",
        ));
        let err = map_cmd_error(missing, &locator);
        assert!(err.is_no_such_element());
        assert!(err.to_string().contains("#ap_password"));

        let stale = CmdError::Standard(WebDriver::new(
            ErrorStatus::StaleElementReference,
            "stale element reference",
        ));
        assert!(matches!(
            map_cmd_error(stale, &locator),
            SessionError::Driver(_)
        ));
    }

    #[test]
    fn test_headless_flag_lands_in_chrome_args() {
        let caps = chrome_capabilities(true);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.iter().any(|a| a == "--headless=new"));

        let caps = chrome_capabilities(false);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }
}
