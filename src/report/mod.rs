//! Operator-facing reports.

pub mod format;

pub use format::{format_clean_summary, format_load_report};
