//! JavaScript bodies evaluated in rendered pages.
//!
//! Each is a function body: values are returned with `return` and
//! arguments arrive as `arguments[i]`.

/// Scroll the window down by `arguments[0]` pixels
pub const SCROLL_BY: &str = "window.scrollBy(0, arguments[0]);";

/// Total scrollable height of the document
pub const SCROLL_HEIGHT: &str = r#"
    const body = document.body;
    return body ? body.scrollHeight : document.documentElement.scrollHeight;
"#;

/// Current `document.readyState`
pub const READY_STATE: &str = "return document.readyState;";

/// Resolved hrefs of every anchor with an href attribute
pub const ANCHOR_HREFS: &str = r#"
    return Array.from(document.querySelectorAll('a[href]')).map(el => el.href);
"#;
