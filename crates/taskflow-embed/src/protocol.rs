//! Messages exchanged with the host page.
//!
//! Every message is a JSON object discriminated by `type`. Outbound messages
//! carry a Unix-millisecond `timestamp`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskflow_core::{DemoCredentials, DemoUser, Task};

use crate::errors::{EmbedError, Result};

/// `type` of the request for credentials.
pub const REQUEST_DEMO_CREDENTIALS: &str = "REQUEST_DEMO_CREDENTIALS";
/// `type` of the host's credentials reply.
pub const DEMO_CREDENTIALS: &str = "DEMO_CREDENTIALS";
/// `type` of the ready notification.
pub const TASKFLOW_READY: &str = "TASKFLOW_READY";
/// `type` of the task-created notification.
pub const TASKFLOW_TASK_CREATED: &str = "TASKFLOW_TASK_CREATED";
/// `type` of the error notification.
pub const TASKFLOW_ERROR: &str = "TASKFLOW_ERROR";

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// A message sent to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// Ask the host for demo credentials.
    #[serde(rename = "REQUEST_DEMO_CREDENTIALS")]
    RequestDemoCredentials {
        /// Send time, Unix millis.
        timestamp: i64,
    },
    /// First task load finished.
    #[serde(rename = "TASKFLOW_READY")]
    Ready {
        /// Session user.
        user: DemoUser,
        /// Send time, Unix millis.
        timestamp: i64,
    },
    /// A task was created.
    #[serde(rename = "TASKFLOW_TASK_CREATED")]
    TaskCreated {
        /// The created task.
        task: Task,
        /// Creating user.
        user: DemoUser,
        /// Send time, Unix millis.
        timestamp: i64,
    },
    /// Something failed.
    #[serde(rename = "TASKFLOW_ERROR")]
    Error {
        /// User-facing message.
        error: String,
        /// Send time, Unix millis.
        timestamp: i64,
    },
}

impl OutboundMessage {
    /// Credentials request stamped now.
    pub fn request_credentials() -> Self {
        Self::RequestDemoCredentials {
            timestamp: now_millis(),
        }
    }

    /// Ready notification stamped now.
    pub fn ready(user: DemoUser) -> Self {
        Self::Ready {
            user,
            timestamp: now_millis(),
        }
    }

    /// Task-created notification stamped now.
    pub fn task_created(task: Task, user: DemoUser) -> Self {
        Self::TaskCreated {
            task,
            user,
            timestamp: now_millis(),
        }
    }

    /// Error notification stamped now.
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            timestamp: now_millis(),
        }
    }

    /// The `type` tag.
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::RequestDemoCredentials { .. } => REQUEST_DEMO_CREDENTIALS,
            Self::Ready { .. } => TASKFLOW_READY,
            Self::TaskCreated { .. } => TASKFLOW_TASK_CREATED,
            Self::Error { .. } => TASKFLOW_ERROR,
        }
    }

    /// Send time, Unix millis.
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::RequestDemoCredentials { timestamp }
            | Self::Ready { timestamp, .. }
            | Self::TaskCreated { timestamp, .. }
            | Self::Error { timestamp, .. } => *timestamp,
        }
    }
}

/// A message received from the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessage {
    /// Credentials for this session.
    DemoCredentials(DemoCredentials),
    /// Any other message type; ignored.
    Other(String),
}

impl InboundMessage {
    /// Interpret a raw host message.
    ///
    /// Anything without a string `type` or with an unknown type is
    /// [`InboundMessage::Other`]. A `DEMO_CREDENTIALS` message whose
    /// `credentials` don't decode is [`EmbedError::Malformed`].
    pub fn parse(raw: &Value) -> Result<Self> {
        let kind = raw.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind != DEMO_CREDENTIALS {
            return Ok(Self::Other(kind.to_owned()));
        }
        let credentials = raw
            .get("credentials")
            .ok_or_else(|| EmbedError::Malformed("missing credentials".to_owned()))?;
        serde_json::from_value(credentials.clone())
            .map(Self::DemoCredentials)
            .map_err(|e| EmbedError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> DemoUser {
        DemoCredentials::fallback().user
    }

    #[test]
    fn request_shape() {
        let msg = OutboundMessage::request_credentials();
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "REQUEST_DEMO_CREDENTIALS");
        assert!(json["timestamp"].as_i64().unwrap() > 1_600_000_000_000);
        assert_eq!(msg.message_type(), REQUEST_DEMO_CREDENTIALS);
    }

    #[test]
    fn ready_and_error_shape() {
        let json = serde_json::to_value(OutboundMessage::ready(user())).unwrap();
        assert_eq!(json["type"], "TASKFLOW_READY");
        assert_eq!(json["user"]["name"], "Demo User");

        let json = serde_json::to_value(OutboundMessage::error("Failed to load tasks")).unwrap();
        assert_eq!(json["type"], "TASKFLOW_ERROR");
        assert_eq!(json["error"], "Failed to load tasks");
    }

    #[test]
    fn parses_credentials() {
        let raw = json!({
            "type": "DEMO_CREDENTIALS",
            "credentials": {
                "user": { "id": "u-42", "name": "Ada", "email": "ada@example.com", "role": "admin" },
                "preferences": { "theme": "dark", "notifications": false }
            }
        });
        let InboundMessage::DemoCredentials(creds) = InboundMessage::parse(&raw).unwrap() else {
            panic!("expected credentials");
        };
        assert_eq!(creds.user.id, "u-42");
        assert_eq!(creds.preferences.theme, "dark");
    }

    #[test]
    fn other_types_are_ignored() {
        assert_eq!(
            InboundMessage::parse(&json!({ "type": "PING" })).unwrap(),
            InboundMessage::Other("PING".into())
        );
        assert_eq!(
            InboundMessage::parse(&json!("hello")).unwrap(),
            InboundMessage::Other(String::new())
        );
    }

    #[test]
    fn malformed_credentials() {
        let err = InboundMessage::parse(&json!({ "type": "DEMO_CREDENTIALS" })).unwrap_err();
        assert_eq!(err, EmbedError::Malformed("missing credentials".into()));

        let err = InboundMessage::parse(&json!({
            "type": "DEMO_CREDENTIALS",
            "credentials": { "user": { "name": "no id" } }
        }))
        .unwrap_err();
        assert!(matches!(err, EmbedError::Malformed(_)));
    }
}
