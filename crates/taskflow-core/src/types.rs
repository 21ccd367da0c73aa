//! Canonical task and category shapes.
//!
//! Both the mock store and the remote record-table adapter normalize into
//! these types. JSON field names follow the wire format used by the host page
//! (`Id`, camelCase for everything else).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::ids::{self, CategoryId, TaskId};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority (form default).
    #[default]
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Sort weight: high = 3, medium = 2, low = 1.
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParseError::unknown("priority", other)),
        }
    }
}

/// Task workflow status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Done. Carries a `completed_at` timestamp.
    Completed,
}

impl TaskStatus {
    /// Wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Next status in the checkbox cycle: pending → in-progress → completed → pending.
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ParseError::unknown("status", other)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Due dates
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a due date.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (truncated to its UTC date).
pub fn parse_due_date(s: &str) -> Result<NaiveDate, ParseError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| ParseError::InvalidDate(s.to_owned()))
}

/// Serde adapter for optional due dates: writes `YYYY-MM-DD`, reads either
/// form accepted by [`parse_due_date`]. Empty strings read as `None`.
pub mod due_date {
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `YYYY-MM-DD` or `null`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from `null`, `""`, a date, or a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_due_date(s).map(Some).map_err(D::Error::custom),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

/// A to-do item.
///
/// Invariant: `completed_at.is_some()` iff `status == Completed`. Every
/// constructor and mutator in this module maintains it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Record ID.
    #[serde(rename = "Id")]
    pub id: TaskId,
    /// Title, never blank.
    pub title: String,
    /// Free-form description, may be empty.
    #[serde(default)]
    pub description: String,
    /// Owning category, carried as a decimal string on the wire.
    #[serde(with = "ids::as_string")]
    pub category_id: CategoryId,
    /// Priority.
    pub priority: TaskPriority,
    /// Status.
    pub status: TaskStatus,
    /// Optional due date.
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Creation time, immutable.
    pub created_at: DateTime<Utc>,
    /// Completion time; present only while the task is completed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Soft-deleted flag.
    #[serde(default)]
    pub archived: bool,
    /// Demo user that owns the task (embedded mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_user_id: Option<String>,
    /// Display name of the creating demo user (embedded mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Task {
    /// Build a new task from creation params.
    ///
    /// Generated fields: `id`, `created_at = now`, `archived = false`, and
    /// `completed_at` (`now` if created already completed).
    pub fn from_params(id: TaskId, params: &TaskCreateParams, now: DateTime<Utc>) -> Self {
        let status = params.status.unwrap_or_default();
        Self {
            id,
            title: params.title.trim().to_owned(),
            description: params.description.clone(),
            category_id: params.category_id,
            priority: params.priority.unwrap_or_default(),
            status,
            due_date: params.due_date,
            created_at: now,
            completed_at: (status == TaskStatus::Completed).then_some(now),
            archived: false,
            demo_user_id: params.demo_user_id.clone(),
            created_by: params.created_by.clone(),
        }
    }

    /// Apply a partial update, then restore the `completed_at` invariant.
    ///
    /// A task that stays completed keeps its original completion time.
    pub fn apply(&mut self, updates: &TaskUpdateParams, now: DateTime<Utc>) {
        if let Some(ref title) = updates.title {
            title.trim().clone_into(&mut self.title);
        }
        if let Some(ref description) = updates.description {
            description.clone_into(&mut self.description);
        }
        if let Some(category_id) = updates.category_id {
            self.category_id = category_id;
        }
        if let Some(priority) = updates.priority {
            self.priority = priority;
        }
        if let Some(status) = updates.status {
            self.status = status;
        }
        if let Some(due_date) = updates.due_date {
            self.due_date = due_date;
        }
        if let Some(ref owner) = updates.demo_user_id {
            self.demo_user_id = Some(owner.clone());
        }
        if let Some(ref created_by) = updates.created_by {
            self.created_by = Some(created_by.clone());
        }
        self.sync_completed_at(now);
    }

    /// Set or clear `completed_at` to match the current status.
    pub fn sync_completed_at(&mut self, now: DateTime<Utc>) {
        match (self.status, self.completed_at) {
            (TaskStatus::Completed, None) => self.completed_at = Some(now),
            (TaskStatus::Completed, Some(_)) => {}
            (_, _) => self.completed_at = None,
        }
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    /// Whether a demo user may see this task: unowned tasks are shared.
    pub fn visible_to(&self, user_id: &str) -> bool {
        self.demo_user_id.as_deref().is_none_or(|owner| owner == user_id)
    }
}

/// Parameters for creating a task.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCreateParams {
    /// Title (validated non-blank by the service).
    pub title: String,
    /// Description.
    pub description: String,
    /// Category reference.
    #[serde(with = "ids::as_string")]
    pub category_id: CategoryId,
    /// Priority, `medium` when omitted.
    pub priority: Option<TaskPriority>,
    /// Initial status, `pending` when omitted.
    pub status: Option<TaskStatus>,
    /// Due date.
    #[serde(with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Demo user owner tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_user_id: Option<String>,
    /// Demo user display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Partial update for a task. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskUpdateParams {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New status.
    pub status: Option<TaskStatus>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
    /// Owner tag.
    pub demo_user_id: Option<String>,
    /// Creator display name.
    pub created_by: Option<String>,
}

impl TaskUpdateParams {
    /// Update that only changes the status.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category
// ─────────────────────────────────────────────────────────────────────────────

/// A task category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Record ID.
    #[serde(rename = "Id")]
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Hex colour (`#RGB` or `#RRGGBB`).
    pub color: String,
    /// Non-archived tasks referencing this category. Derived on read.
    #[serde(default)]
    pub task_count: usize,
}

impl Category {
    /// Recompute `task_count` from a task list.
    pub fn count_tasks(&mut self, tasks: &[Task]) {
        self.task_count = tasks
            .iter()
            .filter(|t| !t.archived && t.category_id == self.id)
            .count();
    }
}

/// Whether `color` is a `#RGB` or `#RRGGBB` hex string.
pub fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Parameters for creating a category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryCreateParams {
    /// Display name.
    pub name: String,
    /// Hex colour.
    pub color: String,
}

/// Partial update for a category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryUpdateParams {
    /// New name.
    pub name: Option<String>,
    /// New colour.
    pub color: Option<String>,
}

impl CategoryUpdateParams {
    /// Apply the update to a category in place.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(ref name) = self.name {
            name.trim().clone_into(&mut category.name);
        }
        if let Some(ref color) = self.color {
            color.clone_into(&mut category.color);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
