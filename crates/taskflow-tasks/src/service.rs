//! Business logic layer for tasks and categories.
//!
//! Wraps a store with validation and not-found handling. Key rules:
//!
//! - **Archived visibility**: `get_all` and `get_by_id` see archived tasks;
//!   category, status and search listings do not.
//! - **Completion timestamp**: `completed_at` is set exactly while a task is
//!   completed, including tasks created as completed.
//! - **Idempotent archive**: archiving an archived task (or restoring an
//!   active one) succeeds and changes nothing.
//! - **Derived counts**: category `task_count` is recomputed from the
//!   non-archived tasks on every read.

use std::sync::Arc;

use chrono::Utc;
use taskflow_core::types::is_hex_color;
use taskflow_core::{
    Category, CategoryCreateParams, CategoryId, CategoryUpdateParams, Task, TaskCreateParams,
    TaskId, TaskStatus, TaskUpdateParams,
};
use tracing::debug;

use crate::errors::{RecordFailure, Result, TaskError};
use crate::store::{BulkOutcome, CategoryStore, TaskFilter, TaskStore};

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TaskError::Validation("Title is required".to_string()));
    }
    Ok(())
}

fn validate_update(updates: &TaskUpdateParams) -> Result<()> {
    match updates.title {
        Some(ref title) => validate_title(title),
        None => Ok(()),
    }
}

fn validate_category_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TaskError::Validation("Category name is required".to_string()));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<()> {
    if !is_hex_color(color) {
        return Err(TaskError::Validation(format!(
            "Color must be a hex value like #5B21B6, got '{color}'"
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Task operations.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    /// Wrap a store.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Every task, archived ones included.
    pub async fn get_all(&self) -> Result<Vec<Task>> {
        debug!(store = self.store.name(), "listing all tasks");
        self.store.list(&TaskFilter::all()).await
    }

    /// One task, archived or not. `None` when absent.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        debug!(task_id = %id, "getting task");
        self.store.get(id).await
    }

    /// Non-archived tasks in a category.
    pub async fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Task>> {
        debug!(category_id = %category_id, "listing tasks by category");
        self.store.list(&TaskFilter::by_category(category_id)).await
    }

    /// Non-archived tasks with a status.
    pub async fn get_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        debug!(status = %status, "listing tasks by status");
        self.store.list(&TaskFilter::by_status(status)).await
    }

    /// Non-archived tasks whose title or description contains `query`,
    /// ignoring case.
    pub async fn search(&self, query: &str) -> Result<Vec<Task>> {
        debug!(query, "searching tasks");
        self.store.list(&TaskFilter::search(query)).await
    }

    /// Create a task.
    pub async fn create(&self, params: &TaskCreateParams) -> Result<Task> {
        validate_title(&params.title)?;
        let task = self.store.insert(params, Utc::now()).await?;
        debug!(task_id = %task.id, title = %task.title, "task created");
        Ok(task)
    }

    /// Create several tasks. Invalid entries are reported alongside store
    /// rejections; valid ones are still created.
    pub async fn create_many(&self, params: &[TaskCreateParams]) -> Result<BulkOutcome<Task>> {
        let mut outcome = BulkOutcome::default();
        let mut valid = Vec::with_capacity(params.len());
        for p in params {
            match validate_title(&p.title) {
                Ok(()) => valid.push(p.clone()),
                Err(e) => outcome.failures.push(RecordFailure::new(e.to_string())),
            }
        }
        if !valid.is_empty() {
            outcome.merge(self.store.insert_many(&valid, Utc::now()).await?);
        }
        debug!(
            created = outcome.succeeded.len(),
            failed = outcome.failures.len(),
            "bulk create finished"
        );
        Ok(outcome)
    }

    /// Apply a partial update.
    pub async fn update(&self, id: TaskId, updates: &TaskUpdateParams) -> Result<Task> {
        validate_update(updates)?;
        let task = self
            .store
            .update(id, updates, Utc::now())
            .await?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        debug!(task_id = %id, status = %task.status, "task updated");
        Ok(task)
    }

    /// Apply several partial updates.
    pub async fn update_many(
        &self,
        updates: &[(TaskId, TaskUpdateParams)],
    ) -> Result<BulkOutcome<Task>> {
        let mut outcome = BulkOutcome::default();
        let mut valid = Vec::with_capacity(updates.len());
        for (id, params) in updates {
            match validate_update(params) {
                Ok(()) => valid.push((*id, params.clone())),
                Err(e) => outcome
                    .failures
                    .push(RecordFailure::new(format!("Task {id}: {e}"))),
            }
        }
        if !valid.is_empty() {
            outcome.merge(self.store.update_many(&valid, Utc::now()).await?);
        }
        debug!(
            updated = outcome.succeeded.len(),
            failed = outcome.failures.len(),
            "bulk update finished"
        );
        Ok(outcome)
    }

    /// Delete a task permanently, returning it.
    pub async fn delete(&self, id: TaskId) -> Result<Task> {
        let task = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        debug!(task_id = %id, "task deleted");
        Ok(task)
    }

    /// Soft-delete a task.
    pub async fn archive(&self, id: TaskId) -> Result<Task> {
        self.set_archived(id, true).await
    }

    /// Undo [`archive`](Self::archive).
    pub async fn restore(&self, id: TaskId) -> Result<Task> {
        self.set_archived(id, false).await
    }

    async fn set_archived(&self, id: TaskId, archived: bool) -> Result<Task> {
        let task = self
            .store
            .set_archived(id, archived)
            .await?
            .ok_or_else(|| TaskError::task_not_found(id))?;
        debug!(task_id = %id, archived, "task archive flag set");
        Ok(task)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Category operations. Reads task counts through the task store.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    tasks: Arc<dyn TaskStore>,
}

impl CategoryService {
    /// Wrap a category store and the task store used for counts.
    pub fn new(store: Arc<dyn CategoryStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { store, tasks }
    }

    async fn active_tasks(&self) -> Result<Vec<Task>> {
        self.tasks.list(&TaskFilter::default()).await
    }

    /// Every category with its current task count.
    pub async fn get_all(&self) -> Result<Vec<Category>> {
        debug!(store = self.store.name(), "listing categories");
        let mut categories = self.store.list().await?;
        let tasks = self.active_tasks().await?;
        for category in &mut categories {
            category.count_tasks(&tasks);
        }
        Ok(categories)
    }

    /// One category with its task count. `None` when absent.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>> {
        debug!(category_id = %id, "getting category");
        let Some(mut category) = self.store.get(id).await? else {
            return Ok(None);
        };
        category.count_tasks(&self.active_tasks().await?);
        Ok(Some(category))
    }

    /// Create a category; it starts with no tasks.
    pub async fn create(&self, params: &CategoryCreateParams) -> Result<Category> {
        validate_category_name(&params.name)?;
        validate_color(&params.color)?;
        let mut category = self.store.insert(params).await?;
        category.task_count = 0;
        debug!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// Apply a partial update.
    pub async fn update(
        &self,
        id: CategoryId,
        updates: &CategoryUpdateParams,
    ) -> Result<Category> {
        if let Some(ref name) = updates.name {
            validate_category_name(name)?;
        }
        if let Some(ref color) = updates.color {
            validate_color(color)?;
        }
        let mut category = self
            .store
            .update(id, updates)
            .await?
            .ok_or_else(|| TaskError::category_not_found(id))?;
        category.count_tasks(&self.active_tasks().await?);
        debug!(category_id = %id, "category updated");
        Ok(category)
    }

    /// Delete a category, returning it. Its tasks keep their category ID.
    pub async fn delete(&self, id: CategoryId) -> Result<Category> {
        let category = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| TaskError::category_not_found(id))?;
        debug!(category_id = %id, "category deleted");
        Ok(category)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
