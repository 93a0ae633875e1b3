mod engine_tests;
mod listbox_tests;

use crate::interaction::config::WaitConfig;

/// Waits that return immediately
fn no_wait() -> WaitConfig {
    WaitConfig {
        selector: None,
        load_state: None,
        timeout_ms: 100,
        debounce_ms: 0,
    }
}
