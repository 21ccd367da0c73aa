//! Integer record ID newtypes.
//!
//! Tasks and categories are keyed by positive integers assigned by the record
//! store (`max(existing) + 1`). Each entity gets its own newtype so a category
//! ID can't be passed where a task ID is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw integer ID.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw integer value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The ID that follows this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0 + 1)
            }

            /// Next free ID for a collection: `max(existing) + 1`, or 1 when empty.
            pub fn next_after<I>(existing: I) -> Self
            where
                I: IntoIterator<Item = Self>,
            {
                existing
                    .into_iter()
                    .max()
                    .map_or(Self(1), Self::next)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<u64>() {
                    Ok(n) if n > 0 => Ok(Self(n)),
                    _ => Err(ParseError::InvalidId(s.to_owned())),
                }
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id! {
    /// Identifier of a task record.
    TaskId
}

record_id! {
    /// Identifier of a category record.
    CategoryId
}

/// The task form preselects category 1.
impl Default for CategoryId {
    fn default() -> Self {
        Self(1)
    }
}

/// Serde adapter for a [`CategoryId`] carried as a decimal string.
///
/// Tasks reference their category as `"categoryId": "3"`. Deserialization
/// also accepts a bare number since remote records are not consistent about it.
pub mod as_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::CategoryId;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    /// Serialize the ID as its decimal string.
    pub fn serialize<S: Serializer>(id: &CategoryId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    /// Deserialize from a decimal string or a number.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CategoryId, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(D::Error::custom),
            Raw::Number(n) => Ok(CategoryId::new(n)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_after_empty_is_one() {
        assert_eq!(TaskId::next_after(Vec::new()), TaskId::new(1));
    }

    #[test]
    fn next_after_uses_max_not_len() {
        let ids = [TaskId::new(2), TaskId::new(9), TaskId::new(4)];
        assert_eq!(TaskId::next_after(ids), TaskId::new(10));
    }

    #[test]
    fn parse_positive() {
        assert_eq!("12".parse::<CategoryId>().unwrap(), CategoryId::new(12));
        assert_eq!(" 7 ".parse::<TaskId>().unwrap(), TaskId::new(7));
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert!("0".parse::<TaskId>().is_err());
        assert!("-3".parse::<TaskId>().is_err());
        assert!("all".parse::<CategoryId>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(TaskId::new(42).to_string(), "42");
    }

    #[test]
    fn serde_is_a_number() {
        let json = serde_json::to_string(&TaskId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskId::new(5));
    }

    #[test]
    fn as_string_accepts_both_forms() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Holder {
            #[serde(with = "as_string")]
            id: CategoryId,
        }

        let from_text: Holder = serde_json::from_str(r#"{"id":"3"}"#).unwrap();
        let from_number: Holder = serde_json::from_str(r#"{"id":3}"#).unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), r#"{"id":"3"}"#);
    }

    #[test]
    fn as_string_rejects_non_numeric() {
        #[derive(Deserialize, Debug)]
        struct Holder {
            #[serde(with = "as_string")]
            #[allow(dead_code)]
            id: CategoryId,
        }
        assert!(serde_json::from_str::<Holder>(r#"{"id":"work"}"#).is_err());
    }
}
