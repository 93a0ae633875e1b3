pub mod html;

#[cfg(test)]
mod tests;

use crate::results::Headers;
use chrono::{DateTime, Utc};

/// Broad classification of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `text/html` or `application/xhtml+xml`
    Html,
    /// Anything else; reported without text and never parsed for links
    Other,
}

impl ContentKind {
    /// Determines the content kind from a Content-Type header value
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("text/html") || content_type.contains("application/xhtml") {
            ContentKind::Html
        } else {
            ::log::debug!("Classifying as non-HTML: {:?}", content_type);
            ContentKind::Other
        }
    }

    /// Returns if the parser should extract links
    pub fn should_extract_links(&self) -> bool {
        matches!(self, ContentKind::Html)
    }
}

/// Result of parsing a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Extracted text content
    pub content: String,
    /// Document title, if present and non-empty
    pub title: Option<String>,
}

/// Parses the Last-Modified header as an HTTP date.
///
/// Unparseable values are treated as absent.
pub fn parse_last_modified(headers: &Headers) -> Option<DateTime<Utc>> {
    let raw = headers.get("last-modified")?;
    match DateTime::parse_from_rfc2822(raw.trim()) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            ::log::debug!("Ignoring unparseable Last-Modified {:?}: {}", raw, e);
            None
        }
    }
}
