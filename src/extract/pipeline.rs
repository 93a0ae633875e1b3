use crate::browser::{RenderSession, SessionLauncher, WebDriverLauncher};
use crate::error::{CrawlError, Result};
use crate::extract::{LinkExtractor, StaticLinkExtractor};
use crate::filter::{host_in_domains, strip_fragment};
use crate::interaction::config::{InteractionConfig, LinkNormalization};
use crate::interaction::{InteractionEngine, InteractionOutcome};
use crate::results::ScrapedPage;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Static anchors first, then browser-driven discovery when the page
/// qualifies. Interaction results are attached to `page.metadata.interaction`.
pub struct LinkExtractionPipeline<L = WebDriverLauncher> {
    engine: InteractionEngine,
    launcher: L,
    force_patterns: Vec<Regex>,
}

impl LinkExtractionPipeline<WebDriverLauncher> {
    /// Pipeline opening WebDriver sessions as described by `config.browser`
    pub fn new(config: InteractionConfig) -> Result<Self> {
        let browser = &config.browser;
        let launcher = WebDriverLauncher::new(&browser.webdriver_url)
            .with_headless(browser.headless)
            .with_user_agent(browser.user_agent.clone());
        Self::with_launcher(config, launcher)
    }
}

impl<L: SessionLauncher> LinkExtractionPipeline<L> {
    pub fn with_launcher(config: InteractionConfig, launcher: L) -> Result<Self> {
        let force_patterns = config
            .dynamic_trigger
            .force_patterns
            .iter()
            .map(|p| Regex::new(p).map_err(|e| CrawlError::invalid_pattern(p, e)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            engine: InteractionEngine::new(config)?,
            launcher,
            force_patterns,
        })
    }

    pub fn config(&self) -> &InteractionConfig {
        self.engine.config()
    }

    /// Whether browser-driven extraction runs for `url`, given how many
    /// static links the page already has
    pub fn should_interact(&self, url: &Url, static_count: usize) -> bool {
        let config = self.config();
        if !config.enabled {
            return false;
        }

        if !config.domains.is_empty() && !host_in_domains(url, &config.domains) {
            ::log::debug!("{} is outside the interaction allow-list", url);
            return false;
        }

        if self.force_patterns.iter().any(|p| p.is_match(url.as_str())) {
            return true;
        }

        static_count < config.dynamic_trigger.min_initial_links || config.any_strategy_enabled()
    }

    async fn interact(&self, url: &str, outcome: &mut InteractionOutcome) -> Vec<String> {
        let session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                outcome.record_error("browser", e);
                return Vec::new();
            }
        };

        let links = self.engine.run(&session, url, outcome).await;

        if let Err(e) = session.close().await {
            ::log::debug!("Closing interaction session for {} failed: {}", url, e);
        }
        links
    }
}

#[async_trait]
impl<L: SessionLauncher> LinkExtractor for LinkExtractionPipeline<L> {
    async fn extract(&self, page: &mut ScrapedPage) -> Result<Vec<String>> {
        let base = Url::parse(&page.url).map_err(|e| CrawlError::invalid_url(&page.url, e))?;
        let static_links = StaticLinkExtractor.links(page)?;

        if !self.should_interact(&base, static_links.len()) {
            return Ok(static_links);
        }

        ::log::debug!(
            "Dynamic extraction triggered for {} ({} static links)",
            page.url,
            static_links.len()
        );

        let mut outcome = InteractionOutcome {
            base_link_count: static_links.len(),
            ..InteractionOutcome::default()
        };
        let discovered = self.interact(&page.url, &mut outcome).await;

        let links = merge(
            &base,
            static_links,
            discovered,
            &self.config().link_normalization,
        );
        ::log::info!(
            "Interaction on {} yielded {} links ({} static)",
            page.url,
            links.len(),
            outcome.base_link_count
        );

        outcome.final_link_count = links.len();
        page.metadata.interaction = Some(outcome);
        Ok(links)
    }
}

/// Static links, then discovered ones, normalized per `rules`
fn merge(
    base: &Url,
    static_links: Vec<String>,
    discovered: Vec<String>,
    rules: &LinkNormalization,
) -> Vec<String> {
    let mut seen = HashSet::new();

    static_links
        .into_iter()
        .chain(discovered.iter().filter_map(|link| resolve(base, link)))
        .map(|link| {
            if rules.strip_fragment {
                strip_fragment(&link)
            } else {
                link
            }
        })
        .filter(|link| !rules.unique || seen.insert(link.clone()))
        .collect()
}

fn resolve(base: &Url, link: &str) -> Option<String> {
    let url = base.join(link.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
