use crate::browser::{ElementSelector, RenderSession};
use crate::interaction::config::{NumericFallback, PaginationConfig};
use crate::interaction::engine::{collect_links, wait_after};
use crate::interaction::outcome::PaginationOutcome;
use regex::Regex;
use std::collections::HashSet;
use std::time::Duration;

/// Clicks "next" up to `max_clicks` times, appending newly revealed links to
/// `working`. Existing entries of `working` are never removed.
pub(crate) async fn apply<S: RenderSession>(
    session: &S,
    config: &PaginationConfig,
    role_name: Option<&Regex>,
    working: &mut Vec<String>,
) -> PaginationOutcome {
    let mut outcome = PaginationOutcome::default();
    let mut seen: HashSet<String> = working.iter().cloned().collect();

    while outcome.clicks < config.max_clicks {
        let mut next = find_next_control(session, &config.next_selector_candidates).await;

        if next.is_none() && config.regex_role_fallback.enabled {
            if let Some(pattern) = role_name {
                next = find_by_role_name(session, &config.regex_role_fallback.roles, pattern).await;
            }
        }

        if next.is_none() && config.numeric_fallback.enabled {
            next = find_next_page_number(session, &config.numeric_fallback).await;
        }

        let Some(control) = next else {
            ::log::debug!("No next control found after {} clicks", outcome.clicks);
            break;
        };

        if let Err(e) = session.click(&control).await {
            ::log::debug!("Clicking next control failed: {}", e);
            break;
        }

        wait_after(session, &config.wait_after_click).await;

        let mut new_links = 0;
        for link in collect_links(session).await {
            if seen.insert(link.clone()) {
                working.push(link);
                new_links += 1;
            }
        }

        outcome.clicks += 1;
        outcome.total_new_links += new_links;

        if config.stop_if_no_new_links && new_links == 0 {
            break;
        }
    }

    outcome
}

/// First candidate whose first match is visible and enabled
async fn find_next_control<S: RenderSession>(
    session: &S,
    candidates: &[ElementSelector],
) -> Option<S::Element> {
    for selector in candidates {
        let Ok(found) = session.locate(selector).await else {
            continue;
        };
        let Some(first) = found.into_iter().next() else {
            continue;
        };
        if is_actionable(session, &first).await {
            return Some(first);
        }
    }
    None
}

async fn find_by_role_name<S: RenderSession>(
    session: &S,
    roles: &[String],
    pattern: &Regex,
) -> Option<S::Element> {
    for role in roles {
        let Ok(elements) = session.find_by_role(role).await else {
            continue;
        };
        for element in elements {
            if !is_actionable(session, &element).await {
                continue;
            }
            if pattern.is_match(&accessible_name(session, &element).await) {
                return Some(element);
            }
        }
    }
    None
}

/// The link or button labelled with the page number after the active marker
async fn find_next_page_number<S: RenderSession>(
    session: &S,
    config: &NumericFallback,
) -> Option<S::Element> {
    let active_selector = config.active_selector.as_ref()?;
    let active = session.locate(active_selector).await.ok()?.into_iter().next()?;
    let current: u32 = session.text(&active).await.ok()?.trim().parse().ok()?;
    let wanted = current.checked_add(1)?.to_string();

    if config.click_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.click_delay_ms)).await;
    }

    for role in ["link", "button"] {
        let Ok(elements) = session.find_by_role(role).await else {
            continue;
        };
        for element in elements {
            if !is_actionable(session, &element).await {
                continue;
            }
            if session.text(&element).await.is_ok_and(|t| t.trim() == wanted) {
                return Some(element);
            }
        }
    }
    None
}

async fn is_actionable<S: RenderSession>(session: &S, element: &S::Element) -> bool {
    session.is_visible(element).await.unwrap_or(false)
        && session.is_enabled(element).await.unwrap_or(false)
}

/// Visible text, falling back to aria-label
async fn accessible_name<S: RenderSession>(session: &S, element: &S::Element) -> String {
    let text = session.text(element).await.unwrap_or_default();
    if !text.trim().is_empty() {
        return text.trim().to_string();
    }
    session
        .attribute(element, "aria-label")
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}
