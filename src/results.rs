use crate::interaction::InteractionOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response headers with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> &str {
        self.get("content-type").unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// Extensible metadata attached to a page by the link-extraction stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    /// What the interaction engine did on this page, when it ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<InteractionOutcome>,

    /// Free-form entries for custom extractors
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// Snapshot of one fetched page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// URL of the page, fragment stripped
    pub url: String,

    /// HTTP status, `0` when no response was received
    pub status: u16,

    /// `true` for statuses in `[200, 400)`
    pub success: bool,

    /// Raw markup (empty for failed or non-HTML fetches)
    pub html: String,

    /// Extracted text content
    pub text: String,

    pub headers: Headers,

    /// Parsed Last-Modified header
    pub last_modified: Option<DateTime<Utc>>,

    /// Title of the page (if available)
    pub title: Option<String>,

    /// Links discovered on the page, before scope filtering
    pub links: Vec<String>,

    pub metadata: PageMetadata,
}

impl ScrapedPage {
    /// Record for a fetch that produced no usable response
    pub fn failed(url: &str, status: u16) -> Self {
        Self {
            url: url.to_string(),
            status,
            success: false,
            html: String::new(),
            text: String::new(),
            headers: Headers::new(),
            last_modified: None,
            title: None,
            links: Vec::new(),
            metadata: PageMetadata::default(),
        }
    }

    /// Empty-text record for a response that is not HTML
    pub fn without_content(url: &str, status: u16, headers: Headers) -> Self {
        Self {
            success: is_success_status(status),
            headers,
            ..Self::failed(url, status)
        }
    }

    pub fn interaction(&self) -> Option<&InteractionOutcome> {
        self.metadata.interaction.as_ref()
    }
}

/// Success convention shared by both fetchers
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}
