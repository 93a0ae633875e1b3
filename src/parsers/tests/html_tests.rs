use crate::parsers::html;
use crate::parsers::{ContentKind, ParseResult};
use url::Url;

fn base() -> Url {
    Url::parse("https://example.org/docs/index.html").unwrap()
}

#[test]
fn test_parse_text_and_title() {
    let html_content = r#"<html><head><title> Docs  Home </title></head>
        <body><p>Hello, world!</p><a href="https://example.com">Link</a></body></html>"#;
    let result = html::parse_text_only(html_content);

    assert_eq!(
        result,
        ParseResult {
            content: "Hello, world! Link".to_string(),
            title: Some("Docs Home".to_string()),
        }
    );
}

#[test]
fn test_non_content_elements_are_removed() {
    let html_content = r#"<html><body>
        <script>var tracking = 1;</script>
        <style>p { color: red; }</style>
        <noscript>Enable JavaScript</noscript>
        <div>Visible <b>text</b></div>
    </body></html>"#;
    let result = html::parse_text_only(html_content);

    assert_eq!(result.content, "Visible text");
    assert!(result.title.is_none());
}

#[test]
fn test_links_resolved_filtered_and_deduplicated() {
    let html_content = r##"<body>
        <a href="guide.html">Guide</a>
        <a href=" /about ">About</a>
        <a href="mailto:team@example.org">Mail</a>
        <a href="javascript:void(0)">Noop</a>
        <a href="">Empty</a>
        <a href="#top">Top</a>
        <a href="guide.html">Guide again</a>
        <a>No href</a>
    </body>"##;

    let links = html::parse_links_only(html_content, &base());
    assert_eq!(
        links,
        vec![
            "https://example.org/docs/guide.html".to_string(),
            "https://example.org/about".to_string(),
            "https://example.org/docs/index.html#top".to_string(),
        ]
    );
}

#[test]
fn test_link_extraction_is_idempotent() {
    let html_content = r#"<body><a href="b">b</a><a href="a">a</a><a href="b">b</a></body>"#;
    let first = html::parse_links_only(html_content, &base());
    let second = html::parse_links_only(html_content, &base());

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_content_kind() {
    assert_eq!(
        ContentKind::from_content_type("text/html; charset=utf-8"),
        ContentKind::Html
    );
    assert_eq!(
        ContentKind::from_content_type("application/xhtml+xml"),
        ContentKind::Html
    );
    assert_eq!(
        ContentKind::from_content_type("application/pdf"),
        ContentKind::Other
    );
    assert!(!ContentKind::from_content_type("").should_extract_links());
}
