//! Page fetchers: a shared HTTP client for plain fetches and a WebDriver
//! session per page for rendered ones.

pub mod browser;
pub mod http;

use crate::config::{CrawlConfig, FetchStrategy};
use crate::error::{FetchError, Result};
use crate::parsers::ContentKind;
use crate::results::{Headers, is_success_status};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

pub use browser::RenderedFetcher;
pub use http::HttpFetcher;

/// Raw result of fetching one URL
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL that was requested
    pub url: String,
    pub status: u16,
    pub headers: Headers,
    /// Decoded body; empty for non-HTML responses or undecodable bodies
    pub body: String,
    /// Title reported by the fetcher itself (rendered fetches)
    pub title: Option<String>,
}

impl FetchResponse {
    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_content_type(self.headers.content_type())
    }

    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }
}

/// Retrieves pages for the scheduler.
///
/// Responses with any HTTP status are returned as `Ok`; `Err` is reserved for
/// requests that produced no usable response (connection, timeout, navigation).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Fetcher selected by `config.fetch_strategy`
pub fn from_config(config: &CrawlConfig) -> Result<Arc<dyn PageFetcher>> {
    Ok(match config.fetch_strategy {
        FetchStrategy::Plain => Arc::new(HttpFetcher::new(config)?),
        FetchStrategy::Rendered => Arc::new(RenderedFetcher::new(config)),
    })
}
