//! Query error types
//!
//! Defines the error conditions that can occur while evaluating field paths
//! and assembling query results.

use thiserror::Error;

/// Errors raised by a path evaluator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// The path expression is not valid in the evaluator's dialect
    #[error("Invalid path '{path}': {message}")]
    Syntax { path: String, message: String },
}

impl PathError {
    pub(crate) fn syntax(path: &str, message: impl Into<String>) -> Self {
        PathError::Syntax {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// A field's path could not be evaluated
    #[error("Path evaluation failed for field {spec}: {cause}")]
    PathEvaluation {
        spec: String,
        #[source]
        cause: PathError,
    },

    /// Top-level columns of one frame differ in length
    #[error("Fields have different lengths: {0}")]
    LengthMismatch(String),

    /// Referenced field does not exist in the frame
    #[error("Field not found: {0}")]
    UnknownField(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
