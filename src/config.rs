use crate::browser::LoadState;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for one crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL to start crawling from
    pub start_url: String,

    /// Recursion depth; `1` fetches only the start page
    #[serde(default = "default_depth")]
    pub depth: usize,

    /// Politeness delay before each recursive fetch, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Skip pages whose Last-Modified predates this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,

    /// Only follow URLs matching this pattern (anchored at the start of the URL)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_follow_regex: Option<String>,

    /// User-Agent header for outbound requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum number of fetches in flight
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Per-request timeout for plain fetches, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on the whole crawl, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_timeout_secs: Option<u64>,

    /// How pages are fetched
    #[serde(default)]
    pub fetch_strategy: FetchStrategy,

    /// Browser settings used by the rendered fetch strategy
    #[serde(default)]
    pub render: RenderOptions,
}

/// Selects the page fetcher implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// One shared HTTP client
    #[default]
    Plain,
    /// WebDriver-rendered navigation
    Rendered,
}

/// Options for the browser-rendered fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Load state to reach after navigation
    #[serde(default = "default_render_wait_until")]
    pub wait_until: LoadState,

    /// Selector to wait for after navigation (best-effort)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<String>,

    #[serde(default = "default_render_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            wait_until: default_render_wait_until(),
            wait_for_selector: None,
            timeout_ms: default_render_timeout_ms(),
        }
    }
}

impl RenderOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_depth() -> usize {
    3
}

fn default_delay_ms() -> u64 {
    1000
}

pub(crate) fn default_user_agent() -> String {
    "web-crawler/1.0".to_string()
}

fn default_concurrency_limit() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    60
}

pub(crate) fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_render_wait_until() -> LoadState {
    LoadState::NetworkIdle
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            depth: default_depth(),
            delay_ms: default_delay_ms(),
            since: None,
            url_follow_regex: None,
            user_agent: default_user_agent(),
            concurrency_limit: default_concurrency_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            total_timeout_secs: None,
            fetch_strategy: FetchStrategy::Plain,
            render: RenderOptions::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout_secs.map(Duration::from_secs)
    }

    /// Concurrency limit clamped to at least one permit
    pub fn permits(&self) -> usize {
        self.concurrency_limit.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = CrawlConfig::from_json(r#"{"start_url": "https://example.com"}"#).unwrap();

        assert_eq!(config.depth, 3);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.concurrency_limit, 8);
        assert_eq!(config.user_agent, "web-crawler/1.0");
        assert_eq!(config.fetch_strategy, FetchStrategy::Plain);
        assert_eq!(config.render.webdriver_url, "http://localhost:4444");
        assert!(config.since.is_none());
    }

    #[test]
    fn test_rendered_strategy_and_since() {
        let config = CrawlConfig::from_json(
            r#"{
                "start_url": "https://example.com",
                "fetch_strategy": "rendered",
                "since": "2024-05-01T00:00:00Z",
                "render": {"headless": false, "wait_until": "domcontentloaded"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.fetch_strategy, FetchStrategy::Rendered);
        assert!(!config.render.headless);
        assert_eq!(config.render.wait_until, LoadState::DomContentLoaded);
        assert_eq!(
            config.since.unwrap().to_rfc3339(),
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_permits_never_zero() {
        let mut config = CrawlConfig::new("https://example.com");
        config.concurrency_limit = 0;
        assert_eq!(config.permits(), 1);
    }
}
