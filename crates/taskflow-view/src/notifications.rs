//! Transient user-facing notifications ("toasts").

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// An operation succeeded.
    Success,
    /// Neutral information.
    Info,
    /// An operation failed.
    Error,
}

/// A single notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Text shown to the user.
    pub message: String,
}

/// Shared, append-only sink of notifications.
///
/// Clones share the same queue, so a renderer can hold one clone and drain
/// it while the controller pushes into another.
#[derive(Clone, Debug, Default)]
pub struct Notifications {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifications {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, kind: NotificationKind, message: impl Into<String>) {
        self.queue.lock().push(Notification {
            kind,
            message: message.into(),
        });
    }

    /// Push a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message);
    }

    /// Push an info notification.
    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    /// Push an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message);
    }

    /// Most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.queue.lock().last().cloned()
    }

    /// Copy of everything queued, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue.lock().clone()
    }

    /// Remove and return everything queued.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Number queued.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
