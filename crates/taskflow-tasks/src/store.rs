//! Record store port.
//!
//! The services talk to storage only through [`TaskStore`] and
//! [`CategoryStore`]. Two implementations exist: the in-memory mock in
//! [`crate::memory`] and the record-table client in [`crate::remote`].
//! Stores return owned values; nothing hands out references into storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskflow_core::{
    Category, CategoryCreateParams, CategoryId, CategoryUpdateParams, Task, TaskCreateParams,
    TaskId, TaskStatus, TaskUpdateParams,
};

use crate::errors::{RecordFailure, Result, TaskError};

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

/// Which tasks a listing should return.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks in this category.
    pub category_id: Option<CategoryId>,
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
    /// Include archived tasks.
    pub include_archived: bool,
}

impl TaskFilter {
    /// Every task, archived ones included.
    pub fn all() -> Self {
        Self {
            include_archived: true,
            ..Self::default()
        }
    }

    /// Non-archived tasks in one category.
    pub fn by_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    /// Non-archived tasks with one status.
    pub fn by_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Non-archived tasks matching a search string.
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            search: Some(query.into()),
            ..Self::default()
        }
    }

    /// Whether this filter narrows beyond the archived flag.
    pub fn is_narrowed(&self) -> bool {
        self.category_id.is_some() || self.status.is_some() || self.search.is_some()
    }

    /// Evaluate the filter against one task.
    pub fn matches(&self, task: &Task) -> bool {
        if task.archived && !self.include_archived {
            return false;
        }
        if self.category_id.is_some_and(|id| id != task.category_id) {
            return false;
        }
        if self.status.is_some_and(|status| status != task.status) {
            return false;
        }
        self.search
            .as_deref()
            .is_none_or(|q| task.matches_lowercase(&q.to_lowercase()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bulk results
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a bulk create or update: what was applied and what was not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkOutcome<T> {
    /// Records that were applied, in request order.
    pub succeeded: Vec<T>,
    /// One entry per rejected record.
    pub failures: Vec<RecordFailure>,
}

impl<T> Default for BulkOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BulkOutcome<T> {
    /// Whether every record was applied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another outcome into this one.
    pub fn merge(&mut self, other: Self) {
        self.succeeded.extend(other.succeeded);
        self.failures.extend(other.failures);
    }

    /// The applied records, or [`TaskError::PartialFailure`] if anything failed.
    pub fn into_result(self) -> Result<Vec<T>> {
        if self.failures.is_empty() {
            Ok(self.succeeded)
        } else {
            Err(TaskError::PartialFailure {
                succeeded: self.succeeded.len(),
                failures: self.failures,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Traits
// ─────────────────────────────────────────────────────────────────────────────

/// Storage for tasks.
///
/// `None`/`false` returns mean "no such record"; the service turns them into
/// [`TaskError::NotFound`] where the operation requires an existing record.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Tasks matching `filter`.
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// One task by ID, archived or not.
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;

    /// Create a task, assigning its ID.
    async fn insert(&self, params: &TaskCreateParams, now: DateTime<Utc>) -> Result<Task>;

    /// Create several tasks; individual records may fail.
    async fn insert_many(
        &self,
        params: &[TaskCreateParams],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>>;

    /// Apply a partial update. `completed_at` follows the resulting status.
    async fn update(
        &self,
        id: TaskId,
        updates: &TaskUpdateParams,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>>;

    /// Apply several partial updates; individual records may fail.
    async fn update_many(
        &self,
        updates: &[(TaskId, TaskUpdateParams)],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>>;

    /// Set the archived flag.
    async fn set_archived(&self, id: TaskId, archived: bool) -> Result<Option<Task>>;

    /// Remove a task permanently, returning it.
    async fn delete(&self, id: TaskId) -> Result<Option<Task>>;
}

/// Storage for categories. Task counts are derived by the service.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Every category.
    async fn list(&self) -> Result<Vec<Category>>;

    /// One category by ID.
    async fn get(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Create a category, assigning its ID.
    async fn insert(&self, params: &CategoryCreateParams) -> Result<Category>;

    /// Apply a partial update.
    async fn update(
        &self,
        id: CategoryId,
        updates: &CategoryUpdateParams,
    ) -> Result<Option<Category>>;

    /// Remove a category, returning it.
    async fn delete(&self, id: CategoryId) -> Result<Option<Category>>;
}
