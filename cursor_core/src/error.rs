//! Cursor error types

use thiserror::Error;

/// Errors from the dynamic configuration entry points.
///
/// Movement and inspection never fail; exhaustion is reported through
/// [`StepResult`](crate::StepResult) instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    /// Configuration text could not be parsed
    #[error("Failed to parse cursor config: {0}")]
    Parse(String),

    /// An option was given a value of the wrong shape
    #[error("Invalid value for option `{name}`: {reason}")]
    InvalidOption { name: String, reason: String },

    /// A configuration record was expected
    #[error("Expected a configuration record")]
    NotARecord,
}
