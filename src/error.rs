use thiserror::Error;

/// Errors that end a crawl or reject its configuration.
///
/// Per-page failures never surface here; they reach the page handler as a
/// [`ScrapedPage`](crate::ScrapedPage) with `success == false`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("interaction failed: {0}")]
    Interaction(String),

    #[error("link extraction failed: {0}")]
    Extraction(String),

    #[error("crawl timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("crawl cancelled")]
    Cancelled,
}

impl CrawlError {
    pub(crate) fn invalid_url(url: &str, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}

impl From<fantoccini::error::CmdError> for CrawlError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        Self::WebDriver(error.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for CrawlError {
    fn from(error: fantoccini::error::NewSessionError) -> Self {
        Self::WebDriver(error.to_string())
    }
}

/// A single failed fetch. Carries the observed status, if any.
#[derive(Debug, Error)]
#[error("fetch of {url} failed: {message}")]
pub struct FetchError {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn new(url: &str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status,
            message: message.into(),
        }
    }

    /// Status reported to the page handler; `0` when nothing was received.
    pub fn reported_status(&self) -> u16 {
        self.status.unwrap_or(0)
    }
}

pub type Result<T, E = CrawlError> = std::result::Result<T, E>;
