use super::no_wait;
use crate::browser::ElementSelector;
use crate::browser::mock::{Effect, MockElement, MockSession, MockState};
use crate::interaction::config::{InteractionConfig, ListboxConfig, PaginationConfig, ScrollConfig};
use crate::interaction::{InteractionEngine, InteractionOutcome, ListboxStatus};
use serde_json::json;

fn all_strategies() -> InteractionConfig {
    InteractionConfig {
        listbox: ListboxConfig {
            enabled: true,
            select_selectors: vec![ElementSelector::parse("select#size")],
            desired_options: vec!["60".to_string()],
            wait_after_select: no_wait(),
            ..ListboxConfig::default()
        },
        scroll: ScrollConfig {
            enabled: true,
            max_steps: 2,
            delay_ms: 0,
            ..ScrollConfig::default()
        },
        pagination: PaginationConfig {
            enabled: true,
            wait_after_click: no_wait(),
            ..PaginationConfig::default()
        },
        ..InteractionConfig::default()
    }
}

fn catalogue_page() -> MockState {
    let mut state = MockState {
        links: vec!["https://shop.example/a".to_string()],
        ..MockState::default()
    };
    let option = state.add(MockElement::new().matching("option").attr("value", "60").text("60"));
    state.add(
        MockElement::new()
            .matching("select#size")
            .value("20")
            .children(vec![option]),
    );
    state.add(
        MockElement::new()
            .matching("a[rel='next']")
            .on_click(Effect::AddLinks(vec!["https://shop.example/b".to_string()])),
    );
    state
}

#[tokio::test]
async fn test_runs_strategies_in_order() {
    let session = MockSession::new(catalogue_page());
    let engine = InteractionEngine::new(all_strategies()).unwrap();
    let mut outcome = InteractionOutcome::default();

    let links = engine
        .run(&session, "https://shop.example/list", &mut outcome)
        .await;

    assert_eq!(
        session.state.lock().unwrap().visited,
        vec!["https://shop.example/list"]
    );
    assert_eq!(session.actions()[0], "select:60");
    assert!(session.actions()[1].starts_with("click:"));
    assert_eq!(outcome.listbox.as_ref().unwrap().status, ListboxStatus::Selected);
    assert_eq!(outcome.scroll.unwrap().performed_steps, 2);
    assert_eq!(outcome.pagination.unwrap().total_new_links, 1);
    assert!(outcome.errors.is_empty());
    assert!(links.contains(&"https://shop.example/a".to_string()));
    assert!(links.contains(&"https://shop.example/b".to_string()));
}

#[tokio::test]
async fn test_failed_strategy_does_not_block_later_ones() {
    let mut state = catalogue_page();
    state.fail_scroll = true;
    let session = MockSession::new(state);
    let engine = InteractionEngine::new(all_strategies()).unwrap();
    let mut outcome = InteractionOutcome::default();

    let links = engine
        .run(&session, "https://shop.example/list", &mut outcome)
        .await;

    assert!(outcome.scroll.is_none());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("scroll:"));
    assert_eq!(outcome.pagination.unwrap().clicks, 2);
    assert!(links.contains(&"https://shop.example/b".to_string()));
}

#[tokio::test]
async fn test_navigation_failure_yields_no_links() {
    let mut state = catalogue_page();
    state.fail_goto = true;
    let session = MockSession::new(state);
    let engine = InteractionEngine::new(all_strategies()).unwrap();
    let mut outcome = InteractionOutcome::default();

    let links = engine
        .run(&session, "https://shop.example/list", &mut outcome)
        .await;

    assert!(links.is_empty());
    assert!(outcome.errors[0].starts_with("navigate:"));
    assert!(session.actions().is_empty());
}

#[tokio::test]
async fn test_disabled_strategies_leave_page_untouched() {
    let session = MockSession::new(catalogue_page());
    let engine = InteractionEngine::new(InteractionConfig::default()).unwrap();
    let mut outcome = InteractionOutcome::default();

    let links = engine
        .run(&session, "https://shop.example/list", &mut outcome)
        .await;

    assert!(session.actions().is_empty());
    assert!(outcome.listbox.is_none() && outcome.scroll.is_none() && outcome.pagination.is_none());
    assert!(links.contains(&"https://shop.example/a".to_string()));
}

#[test]
fn test_invalid_pattern_is_rejected() {
    let config = InteractionConfig::with_overrides(json!({
        "listbox": { "trigger_text_regex": "(unclosed" }
    }))
    .unwrap();
    assert!(InteractionEngine::new(config).is_err());
}
