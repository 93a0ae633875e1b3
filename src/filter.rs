use crate::error::{CrawlError, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Decides which discovered URLs the crawl follows.
///
/// A URL is followed when it is http(s), shares the start URL's host and
/// port, and matches the follow pattern (if any) from its first character.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    host: Option<String>,
    port: Option<u16>,
    follow: Option<Regex>,
}

impl UrlFilter {
    /// Create a filter anchored to `start_url`
    pub fn new(start_url: &Url, follow_pattern: Option<&str>) -> Result<Self> {
        let follow = match follow_pattern {
            Some(pattern) => Some(
                Regex::new(&format!("^(?:{pattern})"))
                    .map_err(|e| CrawlError::invalid_pattern(pattern, e))?,
            ),
            None => None,
        };

        Ok(Self {
            host: start_url.host_str().map(|h| h.to_ascii_lowercase()),
            port: start_url.port_or_known_default(),
            follow,
        })
    }

    /// Determine if a URL should be crawled based on all filtering rules
    pub fn should_crawl(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        if !self.is_same_origin(url) {
            return false;
        }

        match &self.follow {
            Some(regex) => regex.is_match(url.as_str()),
            None => true,
        }
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        let host = url.host_str().map(|h| h.to_ascii_lowercase());
        host.is_some() && host == self.host && url.port_or_known_default() == self.port
    }

    /// Resolves, normalizes and filters candidate links, keeping first-seen order
    pub fn select_next(&self, base: &Url, links: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut selected = Vec::new();

        for link in links {
            let Ok(resolved) = base.join(link) else {
                ::log::trace!("Unresolvable link skipped: {}", link);
                continue;
            };
            let normalized = normalize_url(&resolved);
            if !self.should_crawl(&normalized) {
                ::log::debug!("URL filter rejected: {}", normalized);
                continue;
            }
            if seen.insert(normalized.to_string()) {
                selected.push(normalized.to_string());
            }
        }

        selected
    }
}

/// Create a normalized version of the URL (fragment removed)
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

/// Fragment stripping for link strings that may not parse as absolute URLs
pub fn strip_fragment(link: &str) -> String {
    match Url::parse(link) {
        Ok(url) => normalize_url(&url).to_string(),
        Err(_) => link.split('#').next().unwrap_or_default().to_string(),
    }
}

/// True when the URL's host (or host:port) is listed in `domains`
pub fn host_in_domains(url: &Url, domains: &[String]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    domains
        .iter()
        .any(|d| d.eq_ignore_ascii_case(host) || d.eq_ignore_ascii_case(&authority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin_anchors_to_start_host() {
        let filter = UrlFilter::new(&url("https://example.com/start"), None).unwrap();

        assert!(filter.should_crawl(&url("https://example.com/other")));
        assert!(filter.should_crawl(&url("https://EXAMPLE.com/upper")));
        assert!(!filter.should_crawl(&url("https://other.com/page")));
        assert!(!filter.should_crawl(&url("https://sub.example.com/page")));
        assert!(!filter.should_crawl(&url("https://example.com:8443/page")));
        assert!(!filter.should_crawl(&url("mailto:someone@example.com")));
    }

    #[test]
    fn test_follow_pattern_is_anchored() {
        let filter = UrlFilter::new(
            &url("https://news.example.com/"),
            Some(r"https://news\.example\.com/articles/[^/]+/?$"),
        )
        .unwrap();

        assert!(filter.should_crawl(&url("https://news.example.com/articles/abc")));
        assert!(!filter.should_crawl(&url("https://news.example.com/topics/abc")));

        let unanchored = UrlFilter::new(&url("https://example.com/"), Some("articles")).unwrap();
        assert!(!unanchored.should_crawl(&url("https://example.com/articles/1")));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = UrlFilter::new(&url("https://example.com/"), Some("(unclosed"));
        assert!(matches!(result, Err(CrawlError::InvalidPattern { .. })));
    }

    #[test]
    fn test_select_next_resolves_and_dedups() {
        let base = url("https://example.com/dir/page");
        let filter = UrlFilter::new(&base, None).unwrap();
        let links = vec![
            "a".to_string(),
            "/b#section".to_string(),
            "https://example.com/b".to_string(),
            "https://elsewhere.org/".to_string(),
            "https://example.com/dir/a#top".to_string(),
        ];

        assert_eq!(
            filter.select_next(&base, &links),
            vec![
                "https://example.com/dir/a".to_string(),
                "https://example.com/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(
            strip_fragment("https://example.com/a#frag"),
            "https://example.com/a"
        );
        assert_eq!(strip_fragment("relative/path#x"), "relative/path");
    }

    #[test]
    fn test_host_in_domains() {
        let domains = vec!["www.example.com".to_string(), "127.0.0.1:8080".to_string()];
        assert!(host_in_domains(&url("https://www.example.com/x"), &domains));
        assert!(host_in_domains(&url("http://127.0.0.1:8080/x"), &domains));
        assert!(!host_in_domains(&url("http://127.0.0.1:9090/x"), &domains));
        assert!(!host_in_domains(&url("https://example.com/x"), &domains));
    }
}
