use crate::crawlers::crawler::{PageHandler, StopCondition};
use crate::extract::LinkExtractor;
use crate::fetcher::{FetchResponse, PageFetcher};
use crate::filter::{UrlFilter, normalize_url};
use crate::parsers::{html, parse_last_modified};
use crate::results::{PageMetadata, ScrapedPage};
use crate::visited::VisitedSet;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// State shared by every step of one crawl
pub struct CrawlContext {
    pub(crate) fetcher: Arc<dyn PageFetcher>,
    pub(crate) extractor: Arc<dyn LinkExtractor>,
    pub(crate) handler: Arc<dyn PageHandler>,
    pub(crate) stop: Option<Arc<dyn StopCondition>>,
    pub(crate) filter: UrlFilter,
    pub(crate) visited: VisitedSet,
    pub(crate) permits: Semaphore,
    pub(crate) since: Option<DateTime<Utc>>,
    pub(crate) delay: Duration,
}

/// Crawls from `start_url` down to `depth` levels and resolves once every
/// step has finished. Dropping the future cancels all in-flight steps.
pub async fn start(context: Arc<CrawlContext>, start_url: &Url, depth: usize) {
    ::log::info!("Starting web crawler for: {} (depth {})", start_url, depth);
    let started = std::time::Instant::now();

    visit(Arc::clone(&context), start_url.to_string(), depth).await;

    ::log::info!(
        "Crawl of {} complete - {} URLs visited in {:.2} seconds",
        start_url,
        context.visited.len().await,
        started.elapsed().as_secs_f64()
    );
}

/// One crawl step followed by its children, each on its own task
fn visit(context: Arc<CrawlContext>, url: String, depth: usize) -> BoxFuture<'static, ()> {
    async move {
        if depth == 0 {
            return;
        }

        if context.should_stop(&url, depth).await {
            ::log::debug!("Stop condition abandoned: {}", url);
            return;
        }

        let target = match Url::parse(&url) {
            Ok(parsed) => normalize_url(&parsed),
            Err(e) => {
                ::log::debug!("Skipping unparseable URL {}: {}", url, e);
                return;
            }
        };

        if !context.visited.try_insert(target.as_str()).await {
            ::log::trace!("Skipping already visited: {}", target);
            return;
        }

        let next = context.step(&target, depth).await;
        if next.is_empty() {
            return;
        }

        let mut children = JoinSet::new();
        for link in next {
            if context.visited.contains(&link).await {
                ::log::trace!("Skipping already visited link: {}", link);
                continue;
            }
            if !context.delay.is_zero() {
                tokio::time::sleep(context.delay).await;
            }
            children.spawn(visit(Arc::clone(&context), link, depth - 1));
        }

        while let Some(result) = children.join_next().await {
            if let Err(e) = result {
                ::log::warn!("Crawl step below {} ended abnormally: {}", target, e);
            }
        }
    }
    .boxed()
}

impl CrawlContext {
    /// Fetches, reports and extracts one page; returns the URLs to visit next
    async fn step(&self, url: &Url, depth: usize) -> Vec<String> {
        let Some((page, expand)) = self.load(url, depth).await else {
            return Vec::new();
        };

        if !self.report(&page) || !expand {
            return Vec::new();
        }

        self.filter.select_next(url, &page.links)
    }

    /// Fetch and link extraction, both under one permit. Failed and non-HTML
    /// pages are reported here; `None` means the step is over.
    async fn load(&self, url: &Url, depth: usize) -> Option<(ScrapedPage, bool)> {
        let permit = self.permits.acquire().await.ok()?;
        ::log::debug!("Fetching {}", url);

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                drop(permit);
                ::log::warn!("{}", e);
                self.report(&ScrapedPage::failed(url.as_str(), e.reported_status()));
                return None;
            }
        };

        let last_modified = parse_last_modified(&response.headers);

        if !response.content_kind().should_extract_links() {
            drop(permit);
            let page = ScrapedPage {
                last_modified,
                ..ScrapedPage::without_content(url.as_str(), response.status, response.headers)
            };
            self.report(&page);
            return None;
        }

        let success = response.is_success();
        if success && self.is_stale(last_modified) {
            ::log::debug!("Not modified since cutoff, skipping: {}", url);
            return None;
        }

        let mut page = into_page(response, last_modified);
        let expand = success && depth > 1;
        if expand {
            page.links = self.extract_links(&mut page).await;
            ::log::info!("Found {} links in {}", page.links.len(), url);
        }

        Some((page, expand))
    }

    fn is_stale(&self, last_modified: Option<DateTime<Utc>>) -> bool {
        matches!((self.since, last_modified), (Some(since), Some(modified)) if modified < since)
    }

    async fn should_stop(&self, url: &str, depth: usize) -> bool {
        let Some(stop) = &self.stop else {
            return false;
        };

        let snapshot = self.visited.snapshot().await;
        match std::panic::catch_unwind(AssertUnwindSafe(|| stop.should_stop(url, depth, &snapshot))) {
            Ok(stop) => stop,
            Err(_) => {
                ::log::warn!("Stop condition panicked on {}; continuing", url);
                false
            }
        }
    }

    /// Runs the page handler; a panic counts as "do not expand"
    fn report(&self, page: &ScrapedPage) -> bool {
        match std::panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(page))) {
            Ok(expand) => expand,
            Err(_) => {
                ::log::warn!("Page handler panicked on {}", page.url);
                false
            }
        }
    }

    async fn extract_links(&self, page: &mut ScrapedPage) -> Vec<String> {
        let url = page.url.clone();
        match AssertUnwindSafe(self.extractor.extract(page)).catch_unwind().await {
            Ok(Ok(links)) => links,
            Ok(Err(e)) => {
                ::log::warn!("Link extraction failed on {}: {}", url, e);
                Vec::new()
            }
            Err(_) => {
                ::log::warn!("Link extractor panicked on {}", url);
                Vec::new()
            }
        }
    }
}

fn into_page(response: FetchResponse, last_modified: Option<DateTime<Utc>>) -> ScrapedPage {
    let parsed = html::parse_text_only(&response.body);

    ScrapedPage {
        success: response.is_success(),
        url: response.url,
        status: response.status,
        text: parsed.content,
        title: response.title.or(parsed.title),
        html: response.body,
        headers: response.headers,
        last_modified,
        links: Vec::new(),
        metadata: PageMetadata::default(),
    }
}
