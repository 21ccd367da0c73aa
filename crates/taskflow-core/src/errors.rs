//! Parse errors for the string forms of core types.

use thiserror::Error;

/// Failure to parse one of the wire/string representations in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a positive integer record ID.
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    /// Unknown enum value (priority, status, sort key, status filter).
    #[error("unknown {kind} value: {value:?}")]
    UnknownValue {
        /// Which enum was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Path does not match any route.
    #[error("no route matches path {0:?}")]
    UnknownRoute(String),

    /// Date string is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
}

impl ParseError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            kind,
            value: value.to_owned(),
        }
    }
}
