//! Browser-driven link discovery: listbox selection, scroll expansion and
//! click-through pagination on a rendered page.

pub mod config;
mod engine;
pub mod listbox;
pub mod outcome;
mod pagination;
mod scroll;

#[cfg(test)]
mod tests;

pub use config::InteractionConfig;
pub use engine::InteractionEngine;
pub use outcome::{
    InteractionOutcome, ListboxMode, ListboxOutcome, ListboxStatus, PaginationOutcome,
    ScrollOutcome,
};
