//! Rendering-engine interface used by the rendered fetcher and the
//! interaction engine, with a WebDriver implementation.

pub mod scripts;
pub mod selector;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use selector::ElementSelector;
pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// Document readiness levels a navigation or interaction can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Navigation committed; nothing else awaited
    Commit,
    /// `document.readyState` is `interactive` or later
    DomContentLoaded,
    /// `document.readyState` is `complete`
    Load,
    /// `complete`, followed by a short quiet period
    NetworkIdle,
}

impl LoadState {
    /// Whether a `document.readyState` value satisfies this state
    pub fn is_reached_by(&self, ready_state: &str) -> bool {
        match self {
            LoadState::Commit => true,
            LoadState::DomContentLoaded => matches!(ready_state, "interactive" | "complete"),
            LoadState::Load | LoadState::NetworkIdle => ready_state == "complete",
        }
    }
}

/// Result of a bounded wait. Timing out is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready,
    TimedOut,
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready)
    }
}

/// A live page in a rendering engine
#[async_trait]
pub trait RenderSession: Send + Sync + Sized {
    type Element: Send + Sync;

    /// Navigate and wait (bounded) for `wait_until`
    async fn goto(&self, url: &str, wait_until: LoadState, timeout: Duration) -> Result<()>;

    /// Serialized DOM of the current page
    async fn source(&self) -> Result<String>;

    /// Document title, `None` when blank
    async fn title(&self) -> Result<Option<String>>;

    /// All elements matching `selector`, in document order
    async fn locate(&self, selector: &ElementSelector) -> Result<Vec<Self::Element>>;

    /// Descendants of `parent` matching a CSS selector
    async fn locate_within(&self, parent: &Self::Element, css: &str) -> Result<Vec<Self::Element>>;

    /// Elements carrying an implicit or explicit ARIA role
    async fn find_by_role(&self, role: &str) -> Result<Vec<Self::Element>>;

    async fn is_visible(&self, element: &Self::Element) -> Result<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> Result<bool>;

    /// Rendered text of the element
    async fn text(&self, element: &Self::Element) -> Result<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Current `value` property of a form control
    async fn current_value(&self, element: &Self::Element) -> Result<Option<String>>;

    /// Select the `<option>` of a `<select>` whose value equals `value`
    async fn select_by_value(&self, element: &Self::Element, value: &str) -> Result<()>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Run a script body in the page; `arguments[i]` are bound to `args`
    async fn evaluate(&self, script: &str, args: Vec<serde_json::Value>)
    -> Result<serde_json::Value>;

    async fn wait_for_selector(&self, selector: &ElementSelector, timeout: Duration)
    -> WaitOutcome;

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> WaitOutcome;

    async fn scroll_by(&self, px: i64) -> Result<()> {
        self.evaluate(scripts::SCROLL_BY, vec![px.into()]).await?;
        Ok(())
    }

    /// Total scrollable height, the DOM growth signal for scroll expansion
    async fn scroll_height(&self) -> Result<i64> {
        let value = self.evaluate(scripts::SCROLL_HEIGHT, Vec::new()).await?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|h| h as i64))
            .ok_or_else(|| CrawlError::Interaction(format!("unexpected scroll height {value}")))
    }

    /// Absolute hrefs of every anchor currently in the DOM
    async fn collect_anchor_hrefs(&self) -> Result<Vec<String>> {
        let value = self.evaluate(scripts::ANCHOR_HREFS, Vec::new()).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn close(self) -> Result<()>;
}

/// Opens rendering sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: RenderSession;

    async fn launch(&self) -> Result<Self::Session>;
}
