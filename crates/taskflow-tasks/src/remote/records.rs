//! Adapters between record-table rows and the canonical types.
//!
//! The record API stores custom fields with a `_c` suffix and keeps the
//! built-in `Id`/`Name` columns. Every field is optional on the way in so a
//! sparse row still decodes; conversion to [`Task`]/[`Category`] fills the gaps
//! and rejects values that can't be interpreted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskflow_core::types::due_date;
use taskflow_core::{Category, CategoryId, Task, TaskId, TaskPriority, TaskStatus};

use crate::errors::{Result, TaskError};

/// Fields requested when querying the task table.
pub const TASK_FIELDS: &[&str] = &[
    "Id",
    "Name",
    "title_c",
    "description_c",
    "category_id_c",
    "priority_c",
    "status_c",
    "due_date_c",
    "created_at_c",
    "completed_at_c",
    "archived_c",
    "demo_user_id_c",
    "created_by_c",
];

/// Fields requested when querying the category table.
pub const CATEGORY_FIELDS: &[&str] = &["Id", "Name", "color_c"];

// ─────────────────────────────────────────────────────────────────────────────
// Task rows
// ─────────────────────────────────────────────────────────────────────────────

/// A row of the task table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Record ID; absent when creating.
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Built-in display column, mirrors the title.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_c: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    /// Category lookup: a number, a numeric string, or `{Id, Name}`.
    #[serde(default, with = "lookup", skip_serializing_if = "Option::is_none")]
    pub category_id_c: Option<u64>,
    /// `low` / `medium` / `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_c: Option<String>,
    /// `pending` / `in-progress` / `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_c: Option<String>,
    /// Due date, `YYYY-MM-DD` on write.
    #[serde(default, with = "due_date")]
    pub due_date_c: Option<chrono::NaiveDate>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_c: Option<DateTime<Utc>>,
    /// Completion timestamp; written as `null` when cleared.
    #[serde(default)]
    pub completed_at_c: Option<DateTime<Utc>>,
    /// Soft-delete flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_c: Option<bool>,
    /// Owning demo user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_user_id_c: Option<String>,
    /// Creating demo user's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_c: Option<String>,
}

impl TaskRecord {
    /// Row for a new task: every field of `task` except the ID.
    pub fn for_create(task: &Task) -> Self {
        Self {
            id: None,
            ..Self::from(task)
        }
    }

    /// Interpret the row as a task.
    pub fn into_task(self) -> Result<Task> {
        let id = self
            .id
            .map(TaskId::new)
            .ok_or_else(|| TaskError::remote("task record without Id"))?;
        let invalid = |what: &str, value: &str| {
            TaskError::remote(format!("task {id}: invalid {what} '{value}'"))
        };

        let priority = match self.priority_c.as_deref() {
            None | Some("") => TaskPriority::default(),
            Some(raw) => raw.parse().map_err(|_| invalid("priority", raw))?,
        };
        let status = match self.status_c.as_deref() {
            None | Some("") => TaskStatus::default(),
            Some(raw) => raw.parse().map_err(|_| invalid("status", raw))?,
        };
        let title = self.title_c.or(self.name).unwrap_or_default();
        let created_at = self.created_at_c.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let mut task = Task {
            id,
            title,
            description: self.description_c.unwrap_or_default(),
            category_id: self.category_id_c.map(CategoryId::new).unwrap_or_default(),
            priority,
            status,
            due_date: self.due_date_c,
            created_at,
            completed_at: self.completed_at_c,
            archived: self.archived_c.unwrap_or(false),
            demo_user_id: self.demo_user_id_c.filter(|s| !s.is_empty()),
            created_by: self.created_by_c.filter(|s| !s.is_empty()),
        };
        // rows written by other clients may break the completion invariant
        task.sync_completed_at(created_at);
        Ok(task)
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id.get()),
            name: Some(task.title.clone()),
            title_c: Some(task.title.clone()),
            description_c: Some(task.description.clone()),
            category_id_c: Some(task.category_id.get()),
            priority_c: Some(task.priority.as_str().to_owned()),
            status_c: Some(task.status.as_str().to_owned()),
            due_date_c: task.due_date,
            created_at_c: Some(task.created_at),
            completed_at_c: task.completed_at,
            archived_c: Some(task.archived),
            demo_user_id_c: task.demo_user_id.clone(),
            created_by_c: task.created_by.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category rows
// ─────────────────────────────────────────────────────────────────────────────

/// A row of the category table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    /// Record ID; absent when creating.
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Category name.
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Hex colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_c: Option<String>,
}

impl CategoryRecord {
    /// Interpret the row as a category with `task_count = 0`.
    pub fn into_category(self) -> Result<Category> {
        let id = self
            .id
            .map(CategoryId::new)
            .ok_or_else(|| TaskError::remote("category record without Id"))?;
        Ok(Category {
            id,
            name: self.name.unwrap_or_default(),
            color: self.color_c.unwrap_or_default(),
            task_count: 0,
        })
    }
}

impl From<&Category> for CategoryRecord {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id.get()),
            name: Some(category.name.clone()),
            color_c: Some(category.color.clone()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookup fields
// ─────────────────────────────────────────────────────────────────────────────

/// Serde adapter for lookup columns. Writes the bare integer; reads an
/// integer, a numeric string, or an expanded `{Id, Name}` object.
pub mod lookup {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Str(String),
        Expanded {
            #[serde(rename = "Id")]
            id: u64,
        },
    }

    /// Serialize as an integer or `null`.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(id: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_u64(*id),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from `null`, an integer, a numeric string, or `{Id}`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Int(id) | Raw::Expanded { id }) => Ok(Some(id)),
            Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(Raw::Str(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid lookup id '{s}'"))),
        }
    }
}
