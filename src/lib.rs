// Re-export modules
pub mod browser;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod filter;
pub mod interaction;
pub mod output;
pub mod parsers;
pub mod results;
pub mod visited;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, FetchStrategy, RenderOptions};
pub use crawlers::{MaxPages, PageHandler, StopCondition};
pub use error::{CrawlError, FetchError, Result};
pub use extract::{FnLinkExtractor, LinkExtractionPipeline, LinkExtractor, StaticLinkExtractor};
pub use interaction::{InteractionConfig, InteractionOutcome};
pub use results::{Headers, PageMetadata, ScrapedPage};

use crawlers::web::{self, CrawlContext};
use fetcher::PageFetcher;
use filter::UrlFilter;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use url::Url;
use visited::VisitedSet;

/// Builder for configuring and running one crawl
pub struct Crawler {
    config: CrawlConfig,
    handler: Arc<dyn PageHandler>,
    stop: Option<Arc<dyn StopCondition>>,
    extractor: Arc<dyn LinkExtractor>,
    fetcher: Option<Arc<dyn PageFetcher>>,
}

impl Crawler {
    /// Create a crawler that accepts every page and extracts static links only
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            handler: Arc::new(|_: &ScrapedPage| true),
            stop: None,
            extractor: Arc::new(StaticLinkExtractor),
            fetcher: None,
        }
    }

    /// Load the crawl configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(CrawlConfig::from_file(path)?))
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Set the page handler; its return value decides expansion from each page
    pub fn on_page(mut self, handler: impl PageHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Set the condition consulted before every visit
    pub fn stop_when(mut self, condition: impl StopCondition + 'static) -> Self {
        self.stop = Some(Arc::new(condition));
        self
    }

    /// Replace link extraction entirely
    pub fn with_link_extractor(mut self, extractor: impl LinkExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    /// Extract links through the interaction pipeline (WebDriver-backed)
    pub fn with_interaction(self, config: InteractionConfig) -> Result<Self> {
        Ok(self.with_link_extractor(LinkExtractionPipeline::new(config)?))
    }

    /// Fetch pages through `fetcher` instead of the configured strategy
    pub fn with_fetcher(mut self, fetcher: impl PageFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Run to completion, or until `total_timeout_secs` elapses
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until the crawl completes or `signal` resolves, whichever is first.
    ///
    /// In-flight steps are abandoned on cancellation; visited entries stay.
    pub async fn run_until(self, signal: impl Future<Output = ()>) -> Result<()> {
        let config = &self.config;
        let start_url = Url::parse(&config.start_url)
            .map_err(|e| CrawlError::invalid_url(&config.start_url, e))?;
        let filter = UrlFilter::new(&start_url, config.url_follow_regex.as_deref())?;

        if config.depth < 1 {
            ::log::info!("Depth {} leaves nothing to crawl", config.depth);
            return Ok(());
        }

        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => fetcher::from_config(config)?,
        };

        let context = Arc::new(CrawlContext {
            fetcher,
            extractor: self.extractor,
            handler: self.handler,
            stop: self.stop,
            filter,
            visited: VisitedSet::new(),
            permits: Semaphore::new(config.permits()),
            since: config.since,
            delay: config.delay(),
        });

        let crawl = web::start(context, &start_url, config.depth);
        let bounded = async {
            match config.total_timeout() {
                Some(limit) => tokio::time::timeout(limit, crawl).await.map_err(|_| {
                    ::log::error!("Crawl of {} timed out after {:?}", start_url, limit);
                    CrawlError::TimedOut(limit)
                }),
                None => {
                    crawl.await;
                    Ok(())
                }
            }
        };

        tokio::select! {
            result = bounded => result,
            _ = signal => {
                ::log::info!("Crawl of {} cancelled", start_url);
                Err(CrawlError::Cancelled)
            }
        }
    }

    /// Start the crawl in the background and get a receiver for pages.
    ///
    /// Every page reaching the handler is forwarded; expansion continues while
    /// the receiver is alive and the configured handler agrees. The channel
    /// closes when the crawl ends.
    pub fn generate(self) -> mpsc::UnboundedReceiver<ScrapedPage> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::clone(&self.handler);

        let crawler = self.on_page(move |page: &ScrapedPage| {
            let expand = inner.handle(page);
            tx.send(page.clone()).is_ok() && expand
        });

        tokio::spawn(async move {
            if let Err(e) = crawler.run().await {
                ::log::error!("Crawl ended early: {}", e);
            }
        });

        rx
    }
}

/// Crawl from `config.start_url`, reporting every page to `data_handler`.
///
/// `stop_handler` may abandon individual visits; `link_extractor` replaces
/// the static anchor extractor. Per-page failures reach the handler as pages
/// with `success == false`; only invalid input, the total timeout and
/// cancellation surface as errors.
pub async fn crawl(
    config: CrawlConfig,
    data_handler: impl PageHandler + 'static,
    stop_handler: Option<Arc<dyn StopCondition>>,
    link_extractor: Option<Arc<dyn LinkExtractor>>,
) -> Result<()> {
    let mut crawler = Crawler::new(config).on_page(data_handler);
    crawler.stop = stop_handler;
    if let Some(extractor) = link_extractor {
        crawler.extractor = extractor;
    }
    crawler.run().await
}
