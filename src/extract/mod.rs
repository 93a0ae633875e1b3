//! Link extraction: the static anchor extractor, caller-supplied
//! extractors, and the pipeline that adds browser-driven discovery.

pub mod pipeline;

use crate::error::{CrawlError, Result};
use crate::parsers::html;
use crate::results::ScrapedPage;
use async_trait::async_trait;
use url::Url;

pub use pipeline::LinkExtractionPipeline;

/// Error type returned by closure-based extractors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Produces the ordered, de-duplicated candidate links of a fetched page.
///
/// Extractors may append entries to `page.metadata`; every other field of the
/// page is left as fetched.
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    async fn extract(&self, page: &mut ScrapedPage) -> Result<Vec<String>>;
}

/// Anchor hrefs from the fetched markup, resolved against the page URL
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLinkExtractor;

impl StaticLinkExtractor {
    pub fn links(&self, page: &ScrapedPage) -> Result<Vec<String>> {
        let base = Url::parse(&page.url).map_err(|e| CrawlError::invalid_url(&page.url, e))?;
        Ok(html::parse_links_only(&page.html, &base))
    }
}

#[async_trait]
impl LinkExtractor for StaticLinkExtractor {
    async fn extract(&self, page: &mut ScrapedPage) -> Result<Vec<String>> {
        self.links(page)
    }
}

/// Adapts a synchronous closure into a [`LinkExtractor`]
pub struct FnLinkExtractor<F> {
    f: F,
}

impl<F> FnLinkExtractor<F>
where
    F: Fn(&ScrapedPage) -> std::result::Result<Vec<String>, BoxError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> LinkExtractor for FnLinkExtractor<F>
where
    F: Fn(&ScrapedPage) -> std::result::Result<Vec<String>, BoxError> + Send + Sync,
{
    async fn extract(&self, page: &mut ScrapedPage) -> Result<Vec<String>> {
        (self.f)(page).map_err(|e| CrawlError::Extraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, html: &str) -> ScrapedPage {
        ScrapedPage {
            html: html.to_string(),
            success: true,
            status: 200,
            ..ScrapedPage::failed(url, 200)
        }
    }

    #[tokio::test]
    async fn test_static_links_resolved_in_order() {
        let mut page = page(
            "https://example.com/docs/",
            r#"<a href="b">B</a><a href="/a">A</a><a href="b">again</a><a href="mailto:x@y">m</a>"#,
        );

        let links = StaticLinkExtractor.extract(&mut page).await.unwrap();
        assert_eq!(
            links,
            vec!["https://example.com/docs/b", "https://example.com/a"]
        );
    }

    #[tokio::test]
    async fn test_closure_extractor_errors_surface() {
        let extractor = FnLinkExtractor::new(|page: &ScrapedPage| {
            if page.url.ends_with("/bad") {
                Err("unsupported page".into())
            } else {
                Ok(vec![format!("{}/next", page.url)])
            }
        });

        let mut good = page("https://example.com/ok", "");
        assert_eq!(
            extractor.extract(&mut good).await.unwrap(),
            vec!["https://example.com/ok/next"]
        );

        let mut bad = page("https://example.com/bad", "");
        assert!(matches!(
            extractor.extract(&mut bad).await,
            Err(CrawlError::Extraction(_))
        ));
    }
}
