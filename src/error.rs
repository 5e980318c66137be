//! Error types.
//!
//! `PipelineError` covers the fatal data checks of the cleaning stage.
//! `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - 2: configuration, missing inputs, local file I/O
//! - 3: data validation (month format, schema, duplicate months)
//! - 4: network / statistics API
//! - 5: storage backend

use thiserror::Error;

use crate::domain::{Month, Series};
use crate::store::StoreError;

/// Fatal data errors raised while cleaning a series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{series} RAW: unexpected month format: '{code}'")]
    Format { series: Series, code: String },

    #[error("{series} RAW: missing columns: {}", missing.join(", "))]
    Schema { series: Series, missing: Vec<String> },

    #[error("{series} CLEAN: duplicate month {month} after cleaning")]
    DuplicateMonth { series: Series, month: Month },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::new(5, format!("Storage error: {err}"))
    }
}
