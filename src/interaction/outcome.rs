use serde::{Deserialize, Serialize};

/// What the interaction engine did on one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionOutcome {
    pub listbox: Option<ListboxOutcome>,
    pub scroll: Option<ScrollOutcome>,
    pub pagination: Option<PaginationOutcome>,
    /// Static links found before interaction
    pub base_link_count: usize,
    /// Links returned after merging
    pub final_link_count: usize,
    /// Non-fatal failures, `<stage>:<message>`, in order
    pub errors: Vec<String>,
}

impl InteractionOutcome {
    pub(crate) fn record_error(&mut self, stage: &str, error: impl std::fmt::Display) {
        ::log::warn!("Interaction stage {} failed: {}", stage, error);
        self.errors.push(format!("{stage}:{error}"));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListboxStatus {
    /// No desired options configured
    Skipped,
    /// A desired value was already selected; nothing was touched
    AlreadySelected,
    /// Selected by option value
    Selected,
    /// Selected by normalized option text
    SelectedTextMatch,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListboxMode {
    NativeSelect,
    CustomDropdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListboxOutcome {
    pub status: ListboxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ListboxMode>,
    /// Trigger that opened a custom dropdown (`regex:<pattern>` for text matches)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl ListboxOutcome {
    pub(crate) fn status(status: ListboxStatus) -> Self {
        Self {
            status,
            value: None,
            mode: None,
            trigger: None,
        }
    }

    pub(crate) fn native(status: ListboxStatus, value: &str) -> Self {
        Self {
            status,
            value: Some(value.to_string()),
            mode: Some(ListboxMode::NativeSelect),
            trigger: None,
        }
    }

    pub(crate) fn dropdown(value: &str, trigger: String) -> Self {
        Self {
            status: ListboxStatus::Selected,
            value: Some(value.to_string()),
            mode: Some(ListboxMode::CustomDropdown),
            trigger: Some(trigger),
        }
    }

    /// True when the page now shows (or already showed) a desired option
    pub fn is_satisfied(&self) -> bool {
        matches!(
            self.status,
            ListboxStatus::AlreadySelected
                | ListboxStatus::Selected
                | ListboxStatus::SelectedTextMatch
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOutcome {
    pub performed_steps: usize,
    pub final_height: i64,
    pub stopped_for_stability: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOutcome {
    pub clicks: usize,
    pub total_new_links: usize,
}
