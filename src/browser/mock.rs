//! Scripted in-memory rendering session for tests.

use crate::browser::{ElementSelector, LoadState, RenderSession, SessionLauncher, WaitOutcome};
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Side effect of clicking a mock element
#[derive(Debug, Clone)]
pub(crate) enum Effect {
    /// Anchors appear in the DOM
    AddLinks(Vec<String>),
    /// Elements become visible
    Show(Vec<usize>),
    /// A form control takes a new value
    SetValue { target: usize, value: String },
}

#[derive(Debug, Clone)]
pub(crate) struct MockElement {
    selectors: Vec<String>,
    text: String,
    attrs: HashMap<String, String>,
    visible: bool,
    enabled: bool,
    value: Option<String>,
    children: Vec<usize>,
    on_click: Vec<Effect>,
}

impl MockElement {
    pub(crate) fn new() -> Self {
        Self {
            selectors: Vec::new(),
            text: String::new(),
            attrs: HashMap::new(),
            visible: true,
            enabled: true,
            value: None,
            children: Vec::new(),
            on_click: Vec::new(),
        }
    }

    /// Selector (in its display form) this element answers to
    pub(crate) fn matching(mut self, selector: &str) -> Self {
        self.selectors.push(ElementSelector::parse(selector).to_string());
        self
    }

    pub(crate) fn role(mut self, role: &str) -> Self {
        self.selectors.push(format!("role={role}"));
        self
    }

    pub(crate) fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub(crate) fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub(crate) fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub(crate) fn children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub(crate) fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    /// Served as the page source after navigation
    pub html: String,
    pub title: Option<String>,
    pub elements: Vec<MockElement>,
    pub links: Vec<String>,
    /// Scroll height reported after the n-th scroll (last value repeats)
    pub heights: Vec<i64>,
    pub scrolls: usize,
    /// DOM-mutating actions in order: `click:<id>`, `select:<value>`
    pub actions: Vec<String>,
    pub visited: Vec<String>,
    pub fail_goto: bool,
    pub fail_scroll: bool,
    pub closed: bool,
}

impl MockState {
    pub(crate) fn add(&mut self, element: MockElement) -> usize {
        self.elements.push(element);
        self.elements.len() - 1
    }

    fn element(&self, id: usize) -> Result<&MockElement> {
        self.elements
            .get(id)
            .ok_or_else(|| CrawlError::Interaction(format!("stale element {id}")))
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockSession {
    pub state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub(crate) fn new(state: MockState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn with<T>(&self, f: impl FnOnce(&mut MockState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

#[async_trait]
impl RenderSession for MockSession {
    type Element = usize;

    async fn goto(&self, url: &str, _wait_until: LoadState, _timeout: Duration) -> Result<()> {
        self.with(|s| {
            if s.fail_goto {
                return Err(CrawlError::WebDriver("navigation refused".to_string()));
            }
            s.visited.push(url.to_string());
            Ok(())
        })
    }

    async fn source(&self) -> Result<String> {
        self.with(|s| Ok(s.html.clone()))
    }

    async fn title(&self) -> Result<Option<String>> {
        self.with(|s| Ok(s.title.clone()))
    }

    async fn locate(&self, selector: &ElementSelector) -> Result<Vec<usize>> {
        let key = selector.to_string();
        self.with(|s| {
            Ok(s.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.selectors.contains(&key))
                .map(|(i, _)| i)
                .collect())
        })
    }

    async fn locate_within(&self, parent: &usize, css: &str) -> Result<Vec<usize>> {
        let key = ElementSelector::parse(css).to_string();
        self.with(|s| {
            let parent = s.element(*parent)?;
            Ok(parent
                .children
                .iter()
                .copied()
                .filter(|c| s.elements[*c].selectors.contains(&key))
                .collect())
        })
    }

    async fn find_by_role(&self, role: &str) -> Result<Vec<usize>> {
        let key = format!("role={role}");
        self.with(|s| {
            Ok(s.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.selectors.contains(&key))
                .map(|(i, _)| i)
                .collect())
        })
    }

    async fn is_visible(&self, element: &usize) -> Result<bool> {
        self.with(|s| Ok(s.element(*element)?.visible))
    }

    async fn is_enabled(&self, element: &usize) -> Result<bool> {
        self.with(|s| Ok(s.element(*element)?.enabled))
    }

    async fn text(&self, element: &usize) -> Result<String> {
        self.with(|s| Ok(s.element(*element)?.text.clone()))
    }

    async fn attribute(&self, element: &usize, name: &str) -> Result<Option<String>> {
        self.with(|s| Ok(s.element(*element)?.attrs.get(name).cloned()))
    }

    async fn current_value(&self, element: &usize) -> Result<Option<String>> {
        self.with(|s| Ok(s.element(*element)?.value.clone()))
    }

    async fn select_by_value(&self, element: &usize, value: &str) -> Result<()> {
        self.with(|s| {
            let has_option = s
                .element(*element)?
                .children
                .iter()
                .any(|c| s.elements[*c].attrs.get("value").map(String::as_str) == Some(value));
            if !has_option {
                return Err(CrawlError::Interaction(format!("no option {value}")));
            }
            s.elements[*element].value = Some(value.to_string());
            s.actions.push(format!("select:{value}"));
            Ok(())
        })
    }

    async fn click(&self, element: &usize) -> Result<()> {
        self.with(|s| {
            let effects = s.element(*element)?.on_click.clone();
            s.actions.push(format!("click:{element}"));
            for effect in effects {
                match effect {
                    Effect::AddLinks(links) => s.links.extend(links),
                    Effect::Show(ids) => {
                        for id in ids {
                            s.elements[id].visible = true;
                        }
                    }
                    Effect::SetValue { target, value } => {
                        s.elements[target].value = Some(value);
                    }
                }
            }
            Ok(())
        })
    }

    async fn evaluate(
        &self,
        _script: &str,
        _args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn wait_for_selector(&self, selector: &ElementSelector, _timeout: Duration) -> WaitOutcome {
        match self.locate(selector).await {
            Ok(found) if !found.is_empty() => WaitOutcome::Ready,
            _ => WaitOutcome::TimedOut,
        }
    }

    async fn wait_for_load_state(&self, _state: LoadState, _timeout: Duration) -> WaitOutcome {
        WaitOutcome::Ready
    }

    async fn scroll_by(&self, _px: i64) -> Result<()> {
        self.with(|s| {
            if s.fail_scroll {
                return Err(CrawlError::Interaction("scroll refused".to_string()));
            }
            s.scrolls += 1;
            Ok(())
        })
    }

    async fn scroll_height(&self) -> Result<i64> {
        self.with(|s| {
            let index = s.scrolls.min(s.heights.len().saturating_sub(1));
            Ok(s.heights.get(index).copied().unwrap_or(1000))
        })
    }

    async fn collect_anchor_hrefs(&self) -> Result<Vec<String>> {
        self.with(|s| Ok(s.links.clone()))
    }

    async fn close(self) -> Result<()> {
        self.with(|s| {
            s.closed = true;
            Ok(())
        })
    }
}

/// Launcher handing out sessions over one shared scripted state
#[derive(Clone, Default)]
pub(crate) struct MockLauncher {
    pub session: MockSession,
    pub launches: Arc<Mutex<usize>>,
    pub refuse: bool,
}

impl MockLauncher {
    pub(crate) fn new(state: MockState) -> Self {
        Self {
            session: MockSession::new(state),
            launches: Arc::default(),
            refuse: false,
        }
    }

    pub(crate) fn launch_count(&self) -> usize {
        *self.launches.lock().unwrap()
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Session = MockSession;

    async fn launch(&self) -> Result<MockSession> {
        *self.launches.lock().unwrap() += 1;
        if self.refuse {
            return Err(CrawlError::WebDriver("no browser".to_string()));
        }
        Ok(self.session.clone())
    }
}
