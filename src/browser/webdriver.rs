use crate::browser::selector::role_css;
use crate::browser::{ElementSelector, LoadState, RenderSession, SessionLauncher, WaitOutcome, scripts};
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

/// Interval between readiness polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet period appended to `complete` for `networkidle`
const NETWORK_IDLE_QUIET: Duration = Duration::from_millis(500);

/// Common local WebDriver endpoints tried when the configured one refuses
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Opens WebDriver sessions
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
    headless: bool,
    user_agent: Option<String>,
}

impl WebDriverLauncher {
    pub fn new(webdriver_url: &str) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            headless: true,
            user_agent: None,
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    /// Chrome capabilities carrying the headless flag and user agent
    fn capabilities(&self) -> Map<String, Value> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        if let Some(user_agent) = &self.user_agent {
            args.push(format!("--user-agent={user_agent}"));
        }

        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }

    async fn connect_to(&self, url: &str) -> Result<Client> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        Ok(builder.connect(url).await?)
    }

    /// Connects to the WebDriver instance, falling back to common local endpoints
    async fn connect(&self) -> Result<Client> {
        let first_error = match self.connect_to(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                e
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = self.connect_to(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(first_error)
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    type Session = WebDriverSession;

    async fn launch(&self) -> Result<WebDriverSession> {
        Ok(WebDriverSession {
            client: self.connect().await?,
            closed: false,
        })
    }
}

/// One WebDriver browser session.
///
/// Dropping an unclosed session schedules its shutdown on the runtime.
pub struct WebDriverSession {
    client: Client,
    closed: bool,
}

impl WebDriverSession {
    async fn ready_state(&self) -> Result<String> {
        let value = self.client.execute(scripts::READY_STATE, Vec::new()).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let client = self.client.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    ::log::warn!("Failed to close abandoned WebDriver session: {}", e);
                }
            });
        }
    }
}

#[async_trait]
impl RenderSession for WebDriverSession {
    type Element = Element;

    async fn goto(&self, url: &str, wait_until: LoadState, limit: Duration) -> Result<()> {
        match timeout(limit, self.client.goto(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(CrawlError::WebDriver(format!(
                    "navigation to {url} exceeded {limit:?}"
                )));
            }
        }

        if !self.wait_for_load_state(wait_until, limit).await.is_ready() {
            ::log::debug!("Load state {:?} not reached for {}", wait_until, url);
        }
        Ok(())
    }

    async fn source(&self) -> Result<String> {
        Ok(self.client.source().await?)
    }

    async fn title(&self) -> Result<Option<String>> {
        let title = self.client.title().await?;
        let title = title.trim();
        Ok((!title.is_empty()).then(|| title.to_string()))
    }

    async fn locate(&self, selector: &ElementSelector) -> Result<Vec<Element>> {
        match selector {
            ElementSelector::Css(css) => Ok(self.client.find_all(Locator::Css(css)).await?),
            ElementSelector::Text(text) => {
                let xpath = ElementSelector::text_xpath(text);
                Ok(self.client.find_all(Locator::XPath(&xpath)).await?)
            }
            ElementSelector::HasText { css, text } => {
                let mut matched = Vec::new();
                for element in self.client.find_all(Locator::Css(css)).await? {
                    if element.text().await?.contains(text.as_str()) {
                        matched.push(element);
                    }
                }
                Ok(matched)
            }
        }
    }

    async fn locate_within(&self, parent: &Element, css: &str) -> Result<Vec<Element>> {
        Ok(parent.find_all(Locator::Css(css)).await?)
    }

    async fn find_by_role(&self, role: &str) -> Result<Vec<Element>> {
        let css = role_css(role);
        Ok(self.client.find_all(Locator::Css(&css)).await?)
    }

    async fn is_visible(&self, element: &Element) -> Result<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn is_enabled(&self, element: &Element) -> Result<bool> {
        Ok(element.is_enabled().await?)
    }

    async fn text(&self, element: &Element) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn current_value(&self, element: &Element) -> Result<Option<String>> {
        Ok(element.prop("value").await?)
    }

    async fn select_by_value(&self, element: &Element, value: &str) -> Result<()> {
        Ok(element.select_by_value(value).await?)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        Ok(element.click().await?)
    }

    async fn evaluate(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        Ok(self.client.execute(script, args).await?)
    }

    async fn wait_for_selector(&self, selector: &ElementSelector, limit: Duration) -> WaitOutcome {
        let deadline = Instant::now() + limit;
        loop {
            if let Ok(found) = self.locate(selector).await {
                if !found.is_empty() {
                    return WaitOutcome::Ready;
                }
            }
            if Instant::now() >= deadline {
                return WaitOutcome::TimedOut;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_load_state(&self, state: LoadState, limit: Duration) -> WaitOutcome {
        if state == LoadState::Commit {
            return WaitOutcome::Ready;
        }

        let deadline = Instant::now() + limit;
        loop {
            if let Ok(ready_state) = self.ready_state().await {
                if state.is_reached_by(&ready_state) {
                    if state == LoadState::NetworkIdle {
                        sleep(NETWORK_IDLE_QUIET.min(deadline.saturating_duration_since(Instant::now())))
                            .await;
                    }
                    return WaitOutcome::Ready;
                }
            }
            if Instant::now() >= deadline {
                return WaitOutcome::TimedOut;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(mut self) -> Result<()> {
        self.closed = true;
        Ok(self.client.clone().close().await?)
    }
}
