use serde::{Deserialize, Serialize};
use std::fmt;

/// Element selector in the interaction config dialect.
///
/// Accepts plain CSS, `text=<label>` (deepest element whose visible text
/// contains the label) and `<css>:has-text('<label>')`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementSelector {
    Css(String),
    Text(String),
    HasText { css: String, text: String },
}

impl ElementSelector {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(text) = raw.strip_prefix("text=") {
            return ElementSelector::Text(unquote(text).to_string());
        }

        if let Some(start) = raw.find(":has-text(") {
            if let Some(inner) = raw[start + ":has-text(".len()..].strip_suffix(')') {
                let css = raw[..start].trim();
                return ElementSelector::HasText {
                    css: if css.is_empty() { "*" } else { css }.to_string(),
                    text: unquote(inner).to_string(),
                };
            }
        }

        ElementSelector::Css(raw.to_string())
    }

    /// XPath for a `text=` selector
    pub fn text_xpath(label: &str) -> String {
        let literal = xpath_literal(label);
        format!(
            "//body//*[contains(normalize-space(.), {literal}) and not(.//*[contains(normalize-space(.), {literal})])]"
        )
    }
}

impl From<String> for ElementSelector {
    fn from(raw: String) -> Self {
        ElementSelector::parse(&raw)
    }
}

impl From<&str> for ElementSelector {
    fn from(raw: &str) -> Self {
        ElementSelector::parse(raw)
    }
}

impl From<ElementSelector> for String {
    fn from(selector: ElementSelector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for ElementSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementSelector::Css(css) => write!(f, "{css}"),
            ElementSelector::Text(text) => write!(f, "text={text}"),
            ElementSelector::HasText { css, text } => write!(f, "{css}:has-text('{text}')"),
        }
    }
}

/// CSS approximating the elements that carry an ARIA role
pub fn role_css(role: &str) -> String {
    match role {
        "link" => "a[href], [role='link']".to_string(),
        "button" => {
            "button, input[type='button'], input[type='submit'], [role='button']".to_string()
        }
        "option" => "option, [role='option']".to_string(),
        other => format!("[role='{other}']"),
    }
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

/// XPath string literal for arbitrary text (XPath 1.0 has no escapes)
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
