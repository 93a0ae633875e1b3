use crate::browser::{ElementSelector, RenderSession};
use crate::error::Result;
use crate::interaction::config::ListboxConfig;
use crate::interaction::engine::wait_after;
use crate::interaction::outcome::{ListboxOutcome, ListboxStatus};
use regex::Regex;
use std::sync::LazyLock;

/// Page-size qualifiers trimmed from option labels ("60件", "60 items", "60 per page")
static UNIT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(件表示|件/ページ|件|items?/page|items?|per page)$").expect("static pattern")
});

/// Elements searched when locating a trigger by its text
const TEXT_TRIGGER_SELECTORS: [&str; 3] = ["a", "button", "[role=button]"];

/// Collapse whitespace and strip a trailing unit suffix
pub fn normalize_option_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    UNIT_SUFFIX.replace(&collapsed, "").trim().to_string()
}

/// Selects the first desired option through a native `<select>`, an explicit
/// dropdown trigger, or a trigger found by text pattern, in that order.
pub(crate) async fn apply<S: RenderSession>(
    session: &S,
    config: &ListboxConfig,
    trigger_text: Option<&Regex>,
) -> Result<ListboxOutcome> {
    if config.desired_options.is_empty() {
        return Ok(ListboxOutcome::status(ListboxStatus::Skipped));
    }

    for selector in &config.select_selectors {
        let Some(select) = session.locate(selector).await?.into_iter().next() else {
            continue;
        };
        if !session.is_visible(&select).await.unwrap_or(false) {
            continue;
        }
        if let Some(outcome) = select_native(session, config, &select).await {
            return Ok(outcome);
        }
    }

    for selector in &config.trigger_selectors {
        if let Some(value) = open_dropdown(session, config, selector).await? {
            return Ok(ListboxOutcome::dropdown(&value, selector.to_string()));
        }
    }

    if let Some(pattern) = trigger_text {
        if let Some(trigger) = find_by_text_pattern(session, pattern).await? {
            if session.click(&trigger).await.is_ok() {
                if let Some(value) = choose_dropdown_option(session, config).await? {
                    return Ok(ListboxOutcome::dropdown(
                        &value,
                        format!("regex:{}", pattern.as_str()),
                    ));
                }
            }
        }
    }

    Ok(ListboxOutcome::status(ListboxStatus::NotFound))
}

async fn select_native<S: RenderSession>(
    session: &S,
    config: &ListboxConfig,
    select: &S::Element,
) -> Option<ListboxOutcome> {
    let desired = &config.desired_options;

    if config.skip_if_already_selected {
        let current = session.current_value(select).await.ok().flatten();
        if let Some(current) = current.filter(|c| !c.is_empty() && desired.contains(c)) {
            return Some(ListboxOutcome::native(ListboxStatus::AlreadySelected, &current));
        }
    }

    for wanted in desired {
        if config.prefer_value_match && session.select_by_value(select, wanted).await.is_ok() {
            let current = session.current_value(select).await.ok().flatten();
            if current.as_deref() == Some(wanted.as_str()) {
                wait_after(session, &config.wait_after_select).await;
                return Some(ListboxOutcome::native(ListboxStatus::Selected, wanted));
            }
        }

        let wanted_text = normalize_option_text(wanted);
        let options = session
            .locate_within(select, "option")
            .await
            .unwrap_or_default();
        for option in options {
            let Ok(label) = session.text(&option).await else {
                continue;
            };
            if normalize_option_text(&label) != wanted_text {
                continue;
            }
            let value = session.attribute(&option, "value").await.ok().flatten();
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if session.select_by_value(select, &value).await.is_ok() {
                wait_after(session, &config.wait_after_select).await;
                return Some(ListboxOutcome::native(
                    ListboxStatus::SelectedTextMatch,
                    wanted,
                ));
            }
        }
    }

    None
}

async fn open_dropdown<S: RenderSession>(
    session: &S,
    config: &ListboxConfig,
    trigger: &ElementSelector,
) -> Result<Option<String>> {
    let Some(element) = session.locate(trigger).await?.into_iter().next() else {
        return Ok(None);
    };
    if !session.is_visible(&element).await.unwrap_or(false) {
        return Ok(None);
    }
    if session.click(&element).await.is_err() {
        return Ok(None);
    }
    choose_dropdown_option(session, config).await
}

/// Clicks the visible option whose normalized label matches the earliest desired value
async fn choose_dropdown_option<S: RenderSession>(
    session: &S,
    config: &ListboxConfig,
) -> Result<Option<String>> {
    for selector in &config.option_selectors {
        let candidates = session.locate(selector).await?;
        if candidates.is_empty() {
            continue;
        }

        let mut labelled = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !session.is_visible(&candidate).await.unwrap_or(false) {
                continue;
            }
            if let Ok(label) = session.text(&candidate).await {
                labelled.push((candidate, normalize_option_text(&label)));
            }
        }

        for wanted in &config.desired_options {
            let wanted_text = normalize_option_text(wanted);
            let Some((option, _)) = labelled.iter().find(|(_, label)| *label == wanted_text) else {
                continue;
            };
            if session.click(option).await.is_ok() {
                wait_after(session, &config.wait_after_select).await;
                return Ok(Some(wanted.clone()));
            }
        }
    }

    Ok(None)
}

/// First visible control whose text, aria-label or title matches `pattern`
async fn find_by_text_pattern<S: RenderSession>(
    session: &S,
    pattern: &Regex,
) -> Result<Option<S::Element>> {
    for css in TEXT_TRIGGER_SELECTORS {
        for element in session.locate(&ElementSelector::parse(css)).await? {
            if !session.is_visible(&element).await.unwrap_or(false) {
                continue;
            }
            let text = session.text(&element).await.unwrap_or_default();
            let aria = session
                .attribute(&element, "aria-label")
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            let title = session
                .attribute(&element, "title")
                .await
                .ok()
                .flatten()
                .unwrap_or_default();

            if pattern.is_match(&format!("{} {} {}", text.trim(), aria, title)) {
                return Ok(Some(element));
            }
        }
    }

    Ok(None)
}
