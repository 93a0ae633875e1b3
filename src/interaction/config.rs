use crate::browser::{ElementSelector, LoadState};
use crate::config::default_webdriver_url;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for dynamic, browser-driven link extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Master switch; when off only static links are returned
    pub enabled: bool,

    /// Hosts (or host:port) eligible for dynamic extraction; empty allows all
    pub domains: Vec<String>,

    /// Load state awaited after the initial navigation
    pub wait_until: LoadState,

    pub dynamic_trigger: DynamicTrigger,
    pub listbox: ListboxConfig,
    pub scroll: ScrollConfig,
    pub pagination: PaginationConfig,
    pub link_normalization: LinkNormalization,
    pub browser: BrowserConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            domains: Vec::new(),
            wait_until: LoadState::DomContentLoaded,
            dynamic_trigger: DynamicTrigger::default(),
            listbox: ListboxConfig::default(),
            scroll: ScrollConfig::default(),
            pagination: PaginationConfig::default(),
            link_normalization: LinkNormalization::default(),
            browser: BrowserConfig::default(),
        }
    }
}

/// When dynamic extraction runs for a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicTrigger {
    /// Fire when the static link count is below this
    pub min_initial_links: usize,
    /// Fire when any of these patterns is found in the page URL
    pub force_patterns: Vec<String>,
}

/// Waits applied after a selection or click. All bounded, none fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub selector: Option<ElementSelector>,
    pub load_state: Option<LoadState>,
    pub timeout_ms: u64,
    #[serde(alias = "debounce_wait_ms")]
    pub debounce_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            selector: None,
            load_state: None,
            timeout_ms: 10_000,
            debounce_ms: 200,
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Page-size listbox selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListboxConfig {
    pub enabled: bool,
    /// Native `<select>` candidates
    pub select_selectors: Vec<ElementSelector>,
    /// Elements that open a custom dropdown
    pub trigger_selectors: Vec<ElementSelector>,
    /// Pattern matched against visible text, aria-label and title to find a trigger
    pub trigger_text_regex: Option<String>,
    /// Wanted values in priority order
    pub desired_options: Vec<String>,
    pub prefer_value_match: bool,
    /// Option elements of custom dropdowns
    pub option_selectors: Vec<ElementSelector>,
    pub wait_after_select: WaitConfig,
    pub skip_if_already_selected: bool,
}

impl Default for ListboxConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            select_selectors: Vec::new(),
            trigger_selectors: Vec::new(),
            trigger_text_regex: None,
            desired_options: Vec::new(),
            prefer_value_match: true,
            option_selectors: [
                "ul[role='listbox'] [role='option']",
                "[role='menu'] [role='menuitem']",
                ".dropdown-menu li",
                ".menu li",
                "[role='option']",
            ]
            .into_iter()
            .map(ElementSelector::from)
            .collect(),
            wait_after_select: WaitConfig::default(),
            skip_if_already_selected: true,
        }
    }
}

/// Infinite-scroll expansion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub enabled: bool,
    pub step_px: i64,
    pub max_steps: usize,
    pub delay_ms: u64,
    pub stop_if_no_dom_change: bool,
    /// Consecutive no-growth steps that end the expansion
    pub stability_passes: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            step_px: 1200,
            max_steps: 5,
            delay_ms: 300,
            stop_if_no_dom_change: true,
            stability_passes: 2,
        }
    }
}

/// Click-through pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub enabled: bool,
    /// "Next" control candidates; first visible and enabled match wins
    pub next_selector_candidates: Vec<ElementSelector>,
    pub max_clicks: usize,
    pub wait_after_click: WaitConfig,
    pub stop_if_no_new_links: bool,
    pub regex_role_fallback: RoleFallback,
    pub numeric_fallback: NumericFallback,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            next_selector_candidates: [
                "a[rel='next']",
                "text=次へ",
                "text=さらに表示",
                "text=More",
                "text=Load more",
                "a.next",
                ".pagination-next",
            ]
            .into_iter()
            .map(ElementSelector::from)
            .collect(),
            max_clicks: 5,
            wait_after_click: WaitConfig {
                selector: None,
                load_state: Some(LoadState::DomContentLoaded),
                timeout_ms: 12_000,
                debounce_ms: 250,
            },
            stop_if_no_new_links: true,
            regex_role_fallback: RoleFallback::default(),
            numeric_fallback: NumericFallback::default(),
        }
    }
}

/// Locate "next" by role and accessible-name pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleFallback {
    pub enabled: bool,
    pub roles: Vec<String>,
    pub name_pattern: Option<String>,
}

impl Default for RoleFallback {
    fn default() -> Self {
        Self {
            enabled: false,
            roles: vec!["link".to_string(), "button".to_string()],
            name_pattern: Some("(次へ|さらに表示)".to_string()),
        }
    }
}

/// Click the page number after the active one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericFallback {
    pub enabled: bool,
    /// Marker of the current page number
    pub active_selector: Option<ElementSelector>,
    pub click_delay_ms: u64,
}

impl Default for NumericFallback {
    fn default() -> Self {
        Self {
            enabled: false,
            active_selector: None,
            click_delay_ms: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkNormalization {
    pub strip_fragment: bool,
    pub unique: bool,
}

impl Default for LinkNormalization {
    fn default() -> Self {
        Self {
            strip_fragment: true,
            unique: true,
        }
    }
}

/// Browser session settings for dynamic extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: Option<String>,
    pub timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            user_agent: None,
            timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl InteractionConfig {
    /// Defaults with `overrides` deep-merged on top.
    ///
    /// Nested objects merge key by key; scalars and arrays replace.
    pub fn with_overrides(overrides: Value) -> Result<Self> {
        let mut merged = serde_json::to_value(Self::default())?;
        deep_merge(&mut merged, overrides);
        Ok(serde_json::from_value(merged)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::with_overrides(serde_json::from_str(json)?)
    }

    /// Load overrides from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Whether any interaction strategy is switched on
    pub fn any_strategy_enabled(&self) -> bool {
        self.listbox.enabled || self.scroll.enabled || self.pagination.enabled
    }
}

/// Legacy key spellings accepted in overrides
const KEY_ALIASES: [(&str, &str); 1] = [("debounce_wait_ms", "debounce_ms")];

fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                let key = KEY_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == key)
                    .map_or(key.clone(), |(_, canonical)| canonical.to_string());

                let nested = value.is_object() && base.get(&key).is_some_and(Value::is_object);
                match base.get_mut(&key) {
                    Some(existing) if nested => deep_merge(existing, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}
