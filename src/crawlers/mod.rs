pub mod crawler;
pub mod web;

pub use crawler::{MaxPages, PageHandler, StopCondition};
