#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use core::{Insight, InsightCollection, InsightError};
pub use services::{ConversionBackend, HttpBackend, InsightSession};
pub use tui::{Action, ActionCategory};
