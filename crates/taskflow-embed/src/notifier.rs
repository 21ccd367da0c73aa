//! Fire-and-forget notifications to the host page.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use taskflow_core::{DemoUser, Task};
use tracing::{debug, warn};

use crate::channel::{HostChannel, PERMISSIVE_ORIGIN};
use crate::protocol::OutboundMessage;

/// Posts lifecycle events to the host. A no-op when running standalone.
///
/// Post failures are logged and swallowed; the host is an observer and
/// never blocks the app.
pub struct HostNotifier {
    channel: Option<Arc<dyn HostChannel>>,
    ready_sent: AtomicBool,
}

impl HostNotifier {
    /// Notifier posting through `channel`.
    pub fn new(channel: Arc<dyn HostChannel>) -> Self {
        Self {
            channel: Some(channel),
            ready_sent: AtomicBool::new(false),
        }
    }

    /// Notifier that posts nothing.
    pub fn disabled() -> Self {
        Self {
            channel: None,
            ready_sent: AtomicBool::new(false),
        }
    }

    /// Whether messages go anywhere.
    pub fn is_embedded(&self) -> bool {
        self.channel.is_some()
    }

    /// Whether `TASKFLOW_READY` has been posted.
    pub fn ready_sent(&self) -> bool {
        self.ready_sent.load(Ordering::Acquire)
    }

    async fn post(&self, message: OutboundMessage) -> bool {
        let Some(ref channel) = self.channel else {
            return false;
        };
        let message_type = message.message_type();
        match channel.post(&message, PERMISSIVE_ORIGIN).await {
            Ok(()) => {
                debug!(message_type, "posted to host");
                true
            }
            Err(e) => {
                warn!(message_type, error = %e, "failed to notify host");
                false
            }
        }
    }

    /// Post `TASKFLOW_READY` until one post succeeds; later calls do nothing.
    /// Returns whether this call posted it.
    pub async fn ready(&self, user: &DemoUser) -> bool {
        if !self.is_embedded() || self.ready_sent.swap(true, Ordering::AcqRel) {
            return false;
        }
        let posted = self.post(OutboundMessage::ready(user.clone())).await;
        if !posted {
            self.ready_sent.store(false, Ordering::Release);
        }
        posted
    }

    /// Post `TASKFLOW_TASK_CREATED`.
    pub async fn task_created(&self, task: &Task, user: &DemoUser) {
        let _ = self
            .post(OutboundMessage::task_created(task.clone(), user.clone()))
            .await;
    }

    /// Post `TASKFLOW_ERROR`.
    pub async fn error(&self, message: &str) {
        let _ = self.post(OutboundMessage::error(message)).await;
    }
}
