//! Task service error types.
//!
//! Callers are expected to handle these: the view controller logs them and
//! turns them into a user-facing notification while keeping its state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from task and category operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity type ("Task" or "Category").
        entity: &'static str,
        /// The ID that was looked up.
        id: String,
    },

    /// Input rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record API answered with a failure.
    #[error("Remote error: {message}")]
    Remote {
        /// Message reported by the API (or the HTTP status).
        message: String,
    },

    /// Some records of a bulk operation failed.
    #[error("{} of {} records failed: {}", failures.len(), succeeded + failures.len(), summarize(failures))]
    PartialFailure {
        /// Number of records that were applied.
        succeeded: usize,
        /// One entry per rejected record.
        failures: Vec<RecordFailure>,
    },

    /// Transport failure talking to the record API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON from the record API or the bundled fixtures.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TaskError {
    /// Not-found error for a task.
    pub fn task_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Task",
            id: id.to_string(),
        }
    }

    /// Not-found error for a category.
    pub fn category_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Category",
            id: id.to_string(),
        }
    }

    /// Remote failure with the given message.
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Whether this is a [`TaskError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Why a single record of a bulk operation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    /// Record-level message.
    pub message: String,
    /// Per-field problems, if the API reported any.
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
}

impl RecordFailure {
    /// Failure with a message and no field errors.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: Vec::new(),
        }
    }
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for field in &self.field_errors {
            write!(f, "; {}: {}", field.field_label, field.message)?;
        }
        Ok(())
    }
}

/// A field-level validation error reported by the record API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Field the message refers to.
    pub field_label: String,
    /// What was wrong with it.
    pub message: String,
}

fn summarize(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}
