use crate::browser::RenderSession;
use crate::error::{CrawlError, Result};
use crate::interaction::config::{InteractionConfig, WaitConfig};
use crate::interaction::{InteractionOutcome, listbox, pagination, scroll};
use regex::Regex;
use std::collections::HashSet;

/// Drives a rendered page through listbox selection, scroll expansion and
/// pagination, collecting the anchors each step reveals.
#[derive(Debug, Clone)]
pub struct InteractionEngine {
    config: InteractionConfig,
    trigger_text: Option<Regex>,
    role_name: Option<Regex>,
}

impl InteractionEngine {
    pub fn new(config: InteractionConfig) -> Result<Self> {
        let trigger_text = compile(config.listbox.trigger_text_regex.as_deref())?;
        let role_name = compile(config.pagination.regex_role_fallback.name_pattern.as_deref())?;

        Ok(Self {
            config,
            trigger_text,
            role_name,
        })
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Navigates `session` to `url` and runs the enabled strategies in order:
    /// listbox, scroll, collect, pagination, final collect.
    ///
    /// Strategy failures are recorded in `outcome` and never stop later
    /// strategies. Returns every link seen, in discovery order.
    pub async fn run<S: RenderSession>(
        &self,
        session: &S,
        url: &str,
        outcome: &mut InteractionOutcome,
    ) -> Vec<String> {
        let config = &self.config;

        if let Err(e) = session
            .goto(url, config.wait_until, config.browser.timeout())
            .await
        {
            outcome.record_error("navigate", e);
            return Vec::new();
        }

        if config.listbox.enabled {
            match listbox::apply(session, &config.listbox, self.trigger_text.as_ref()).await {
                Ok(result) => {
                    ::log::debug!("Listbox on {}: {:?}", url, result.status);
                    outcome.listbox = Some(result);
                }
                Err(e) => outcome.record_error("listbox", e),
            }
        }

        if config.scroll.enabled {
            match scroll::apply(session, &config.scroll).await {
                Ok(result) => outcome.scroll = Some(result),
                Err(e) => outcome.record_error("scroll", e),
            }
        }

        let mut links = collect_links(session).await;

        if config.pagination.enabled {
            let result =
                pagination::apply(session, &config.pagination, self.role_name.as_ref(), &mut links)
                    .await;
            ::log::debug!(
                "Pagination on {}: {} clicks, {} new links",
                url,
                result.clicks,
                result.total_new_links
            );
            outcome.pagination = Some(result);
        }

        links.extend(collect_links(session).await);
        links
    }
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).map_err(|e| CrawlError::invalid_pattern(p, e)))
        .transpose()
}

/// Anchors currently in the DOM, first occurrence kept. Failures yield nothing.
pub(crate) async fn collect_links<S: RenderSession>(session: &S) -> Vec<String> {
    match session.collect_anchor_hrefs().await {
        Ok(hrefs) => {
            let mut seen = HashSet::new();
            hrefs.into_iter().filter(|h| seen.insert(h.clone())).collect()
        }
        Err(e) => {
            ::log::debug!("Collecting anchors failed: {}", e);
            Vec::new()
        }
    }
}

/// Best-effort settle after a selection or click
pub(crate) async fn wait_after<S: RenderSession>(session: &S, wait: &WaitConfig) {
    if let Some(selector) = &wait.selector {
        if !session.wait_for_selector(selector, wait.timeout()).await.is_ready() {
            ::log::debug!("Timed out waiting for {}; continuing", selector);
        }
    }

    if let Some(state) = wait.load_state {
        if !session.wait_for_load_state(state, wait.timeout()).await.is_ready() {
            ::log::debug!("Timed out waiting for load state {:?}; continuing", state);
        }
    }

    if wait.debounce_ms > 0 {
        tokio::time::sleep(wait.debounce()).await;
    }
}
