//! Search-box debounce.
//!
//! Each keystroke pushes the deadline out by the configured delay; the
//! draft is applied once the deadline passes with no further input.
//! Clearing the box applies immediately.

use std::time::Duration;

use tokio::time::Instant;

/// Debounced search text.
pub struct SearchDebounce {
    delay: Duration,
    draft: String,
    applied: String,
    deadline: Option<Instant>,
}

impl SearchDebounce {
    /// Debounce with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            draft: String::new(),
            applied: String::new(),
            deadline: None,
        }
    }

    /// Record a keystroke and restart the quiet period.
    pub fn input(&mut self, text: impl Into<String>) {
        self.draft = text.into();
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Empty the box and apply that right away.
    pub fn clear(&mut self) {
        self.draft.clear();
        self.applied.clear();
        self.deadline = None;
    }

    /// Text as typed so far.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Text currently driving the filter.
    pub fn applied(&self) -> &str {
        &self.applied
    }

    /// Whether a keystroke is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Apply the draft if the quiet period has already passed.
    pub fn poll_elapsed(&mut self) -> Option<&str> {
        let deadline = self.deadline?;
        if deadline > Instant::now() {
            return None;
        }
        Some(self.apply())
    }

    /// Wait out the quiet period and apply the draft. Returns `None` at once
    /// when nothing is pending.
    pub async fn settled(&mut self) -> Option<&str> {
        let deadline = self.deadline?;
        tokio::time::sleep_until(deadline).await;
        Some(self.apply())
    }

    fn apply(&mut self) -> &str {
        self.deadline = None;
        self.applied.clone_from(&self.draft);
        &self.applied
    }
}
