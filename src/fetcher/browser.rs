use crate::browser::{ElementSelector, RenderSession, SessionLauncher, WebDriverLauncher};
use crate::config::{CrawlConfig, RenderOptions};
use crate::error::{CrawlError, FetchError};
use crate::fetcher::{FetchResponse, PageFetcher};
use crate::results::Headers;
use async_trait::async_trait;
use url::Url;

/// Fetches pages by navigating a browser session, one session per page.
///
/// WebDriver does not expose the HTTP exchange, so a completed navigation is
/// reported as status 200 with an HTML content type and no Last-Modified.
pub struct RenderedFetcher<L = WebDriverLauncher> {
    launcher: L,
    options: RenderOptions,
}

impl RenderedFetcher<WebDriverLauncher> {
    pub fn new(config: &CrawlConfig) -> Self {
        let options = config.render.clone();
        let launcher = WebDriverLauncher::new(&options.webdriver_url)
            .with_headless(options.headless)
            .with_user_agent(Some(config.user_agent.clone()));
        Self { launcher, options }
    }
}

impl<L: SessionLauncher> RenderedFetcher<L> {
    pub fn with_launcher(launcher: L, options: RenderOptions) -> Self {
        Self { launcher, options }
    }

    async fn render<S: RenderSession>(&self, session: &S, url: &Url) -> Result<FetchResponse, FetchError> {
        let options = &self.options;
        let failed = |e: CrawlError| FetchError::new(url.as_str(), None, e.to_string());

        session
            .goto(url.as_str(), options.wait_until, options.timeout())
            .await
            .map_err(failed)?;

        if let Some(selector) = &options.wait_for_selector {
            let selector = ElementSelector::parse(selector);
            if !session
                .wait_for_selector(&selector, options.timeout())
                .await
                .is_ready()
            {
                ::log::debug!("{} did not appear on {}; using current DOM", selector, url);
            }
        }

        let body = session.source().await.map_err(failed)?;
        let title = session.title().await.unwrap_or_default();

        let mut headers = Headers::new();
        headers.insert("content-type", "text/html");

        Ok(FetchResponse {
            url: url.to_string(),
            status: 200,
            headers,
            body,
            title,
        })
    }
}

#[async_trait]
impl<L: SessionLauncher> PageFetcher for RenderedFetcher<L> {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let session = self
            .launcher
            .launch()
            .await
            .map_err(|e| FetchError::new(url.as_str(), None, e.to_string()))?;

        let result = self.render(&session, url).await;

        if let Err(e) = session.close().await {
            ::log::debug!("Closing render session for {} failed: {}", url, e);
        }
        result
    }
}
