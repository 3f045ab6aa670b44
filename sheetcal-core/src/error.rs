//! Error types for sheetcal.
//!
//! Layout itself never fails: overflow is data, and a handler without a
//! window yields an empty result. Only the edges (rule parsing, config,
//! windows built from user input, event sources) produce errors.

use thiserror::Error;

/// Errors that can occur in sheetcal operations.
#[derive(Error, Debug)]
pub enum SheetCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Event source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for sheetcal operations.
pub type SheetCalResult<T> = Result<T, SheetCalError>;
