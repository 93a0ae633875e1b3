use crate::config::CrawlConfig;
use crate::error::{FetchError, Result};
use crate::fetcher::{FetchResponse, PageFetcher};
use crate::parsers::ContentKind;
use crate::results::Headers;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGES: &str = "en,*;q=0.5";

/// Builds the HTTP client shared by every fetch of a crawl
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGES));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET over one pooled client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.request_timeout())?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            FetchError::new(url.as_str(), e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str(), value.to_string()))
            })
            .collect();

        let body = if ContentKind::from_content_type(headers.content_type()).should_extract_links()
        {
            response.text().await.unwrap_or_else(|e| {
                ::log::debug!("Undecodable body from {}: {}", url, e);
                String::new()
            })
        } else {
            String::new()
        };

        Ok(FetchResponse {
            url: url.to_string(),
            status,
            headers,
            body,
            title: None,
        })
    }
}
