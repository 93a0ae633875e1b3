use super::no_wait;
use crate::browser::ElementSelector;
use crate::browser::mock::{Effect, MockElement, MockSession, MockState};
use crate::interaction::config::ListboxConfig;
use crate::interaction::listbox::{self, normalize_option_text};
use crate::interaction::{ListboxMode, ListboxStatus};
use regex::Regex;

fn listbox_config(desired: &[&str]) -> ListboxConfig {
    ListboxConfig {
        enabled: true,
        select_selectors: vec![ElementSelector::parse("select#dataDisplay")],
        desired_options: desired.iter().map(|d| d.to_string()).collect(),
        wait_after_select: no_wait(),
        ..ListboxConfig::default()
    }
}

/// Native select offering `(value, label)` options with `selected` as current value
fn native_select(options: &[(&str, &str)], selected: &str) -> MockState {
    let mut state = MockState::default();
    let children = options
        .iter()
        .map(|(value, label)| {
            state.add(
                MockElement::new()
                    .matching("option")
                    .attr("value", value)
                    .text(label),
            )
        })
        .collect();
    state.add(
        MockElement::new()
            .matching("select#dataDisplay")
            .value(selected)
            .children(children),
    );
    state
}

#[test]
fn test_normalize_option_text() {
    assert_eq!(normalize_option_text("  60件 "), "60");
    assert_eq!(normalize_option_text("60件表示"), "60");
    assert_eq!(normalize_option_text("60 件/ページ"), "60");
    assert_eq!(normalize_option_text("60 Items"), "60");
    assert_eq!(normalize_option_text("60 items/page"), "60");
    assert_eq!(normalize_option_text("60\n  per page"), "60");
    assert_eq!(normalize_option_text("Show   all"), "Show all");
}

#[tokio::test]
async fn test_already_selected_is_left_untouched() {
    let session = MockSession::new(native_select(
        &[("15", "15"), ("45", "45"), ("60", "60")],
        "45",
    ));
    let config = listbox_config(&["60", "45"]);

    for _ in 0..2 {
        let outcome = listbox::apply(&session, &config, None).await.unwrap();
        assert_eq!(outcome.status, ListboxStatus::AlreadySelected);
        assert_eq!(outcome.value.as_deref(), Some("45"));
        assert_eq!(outcome.mode, Some(ListboxMode::NativeSelect));
        assert!(outcome.is_satisfied());
    }
    assert!(session.actions().is_empty());
}

#[tokio::test]
async fn test_value_match_prefers_first_desired() {
    let session = MockSession::new(native_select(
        &[("15", "15"), ("45", "45"), ("60", "60")],
        "15",
    ));
    let outcome = listbox::apply(&session, &listbox_config(&["60", "45"]), None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ListboxStatus::Selected);
    assert_eq!(outcome.value.as_deref(), Some("60"));
    assert_eq!(session.actions(), vec!["select:60"]);
}

#[tokio::test]
async fn test_text_match_when_values_differ() {
    let session = MockSession::new(native_select(
        &[("opt-15", "15件表示"), ("opt-60", "60件表示")],
        "opt-15",
    ));
    let outcome = listbox::apply(&session, &listbox_config(&["60"]), None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ListboxStatus::SelectedTextMatch);
    assert_eq!(outcome.value.as_deref(), Some("60"));
    assert_eq!(session.actions(), vec!["select:opt-60"]);
}

#[tokio::test]
async fn test_hidden_select_falls_through_to_not_found() {
    let mut state = native_select(&[("60", "60")], "15");
    let select = state.elements.len() - 1;
    state.elements[select] = state.elements[select].clone().hidden();
    let session = MockSession::new(state);

    let outcome = listbox::apply(&session, &listbox_config(&["60"]), None)
        .await
        .unwrap();
    assert_eq!(outcome.status, ListboxStatus::NotFound);
    assert!(session.actions().is_empty());
}

#[tokio::test]
async fn test_custom_dropdown_trigger() {
    let mut state = MockState::default();
    let thirty = state.add(
        MockElement::new()
            .matching("[role='option']")
            .text("30 items")
            .hidden(),
    );
    let sixty = state.add(
        MockElement::new()
            .matching("[role='option']")
            .text("60 items")
            .hidden(),
    );
    let trigger = state.add(
        MockElement::new()
            .matching(".size-toggle")
            .on_click(Effect::Show(vec![thirty, sixty])),
    );
    let session = MockSession::new(state);

    let config = ListboxConfig {
        select_selectors: Vec::new(),
        trigger_selectors: vec![ElementSelector::parse(".size-toggle")],
        ..listbox_config(&["60", "30"])
    };
    let outcome = listbox::apply(&session, &config, None).await.unwrap();

    assert_eq!(outcome.status, ListboxStatus::Selected);
    assert_eq!(outcome.mode, Some(ListboxMode::CustomDropdown));
    assert_eq!(outcome.value.as_deref(), Some("60"));
    assert_eq!(outcome.trigger.as_deref(), Some(".size-toggle"));
    assert_eq!(
        session.actions(),
        vec![format!("click:{trigger}"), format!("click:{sixty}")]
    );
}

#[tokio::test]
async fn test_trigger_found_by_text_pattern() {
    let mut state = MockState::default();
    let option = state.add(
        MockElement::new()
            .matching(".dropdown-menu li")
            .text("45件")
            .hidden(),
    );
    state.add(MockElement::new().matching("a").text("Home"));
    state.add(
        MockElement::new()
            .matching("button")
            .attr("aria-label", "表示件数を変更")
            .on_click(Effect::Show(vec![option])),
    );
    let session = MockSession::new(state);

    let pattern = Regex::new("(表示件数|件ごと)").unwrap();
    let config = ListboxConfig {
        select_selectors: Vec::new(),
        ..listbox_config(&["60", "45"])
    };
    let outcome = listbox::apply(&session, &config, Some(&pattern))
        .await
        .unwrap();

    assert_eq!(outcome.status, ListboxStatus::Selected);
    assert_eq!(outcome.value.as_deref(), Some("45"));
    assert_eq!(outcome.trigger.as_deref(), Some("regex:(表示件数|件ごと)"));
}

#[tokio::test]
async fn test_no_desired_options_is_skipped() {
    let session = MockSession::new(native_select(&[("60", "60")], "15"));
    let outcome = listbox::apply(&session, &listbox_config(&[]), None)
        .await
        .unwrap();

    assert_eq!(outcome.status, ListboxStatus::Skipped);
    assert!(!outcome.is_satisfied());
}
