use crate::parsers::ParseResult;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("static selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Elements whose text never counts as page content
const NON_CONTENT: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parses HTML content but only extracts text and title (no links)
pub fn parse_text_only(html: &str) -> ParseResult {
    let doc = Html::parse_document(html);

    ParseResult {
        content: extract_text(&doc),
        title: extract_title(&doc),
    }
}

/// Parses HTML content and only extracts links (no text)
pub fn parse_links_only(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    anchor_links(&doc, base)
}

/// Body text with non-content elements removed and whitespace collapsed
pub fn extract_text(doc: &Html) -> String {
    let root = doc
        .select(&BODY)
        .next()
        .unwrap_or_else(|| doc.root_element());

    let mut chunks = Vec::new();
    collect_text(root, &mut chunks);

    chunks.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, chunks: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            chunks.push(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !NON_CONTENT.contains(&child_element.value().name()) {
                collect_text(child_element, chunks);
            }
        }
    }
}

pub fn extract_title(doc: &Html) -> Option<String> {
    let title = doc
        .select(&TITLE)
        .next()?
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}

/// Anchor hrefs resolved to absolute http(s) URLs, first occurrence kept
fn anchor_links(doc: &Html, base: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
