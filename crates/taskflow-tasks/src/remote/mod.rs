//! Record-table backed stores.
//!
//! Listings fetch a single page of `page_limit` rows; there is no further
//! pagination. Category, status and archived filters are pushed to the API,
//! text search is applied locally on the returned page.

pub mod client;
pub mod records;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskflow_core::{
    Category, CategoryCreateParams, CategoryId, CategoryUpdateParams, Task, TaskCreateParams,
    TaskId, TaskUpdateParams,
};
use taskflow_settings::RemoteSettings;
use tracing::warn;

use crate::errors::{RecordFailure, Result, TaskError};
use crate::store::{BulkOutcome, CategoryStore, TaskFilter, TaskStore};

pub use client::{QueryRequest, RecordClient, RecordResult};
pub use records::{CategoryRecord, TaskRecord};

use client::single;
use records::{CATEGORY_FIELDS, TASK_FIELDS};

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Task store over the record-table API.
pub struct RemoteTaskStore {
    client: Arc<RecordClient>,
    table: String,
    page_limit: u32,
}

impl RemoteTaskStore {
    /// Store using `settings.task_table`.
    pub fn new(client: Arc<RecordClient>, settings: &RemoteSettings) -> Self {
        Self {
            client,
            table: settings.task_table.clone(),
            page_limit: settings.page_limit,
        }
    }

    fn query_for(&self, filter: &TaskFilter) -> QueryRequest {
        let mut query = QueryRequest::new(TASK_FIELDS, self.page_limit).order_desc("created_at_c");
        if !filter.include_archived {
            query = query.where_equal("archived_c", false);
        }
        if let Some(category_id) = filter.category_id {
            query = query.where_equal("category_id_c", category_id.get());
        }
        if let Some(status) = filter.status {
            query = query.where_equal("status_c", status.as_str());
        }
        query
    }

    /// Convert a mutation result, falling back to the locally computed task
    /// when the API does not echo the row.
    fn accept(result: Option<TaskRecord>, local: Task) -> Result<Task> {
        match result {
            Some(record) => record.into_task(),
            None => Ok(local),
        }
    }

    async fn patch(&self, task: &Task) -> Result<Task> {
        let results = self
            .client
            .update(&self.table, &[TaskRecord::from(task)])
            .await?;
        Self::accept(single(results)?, task.clone())
    }
}

/// Pair per-record results with the records that were submitted.
///
/// Each submitted record ends up in exactly one of `succeeded` or `failures`.
/// A record the API returned no result for counts as failed; more results
/// than submitted records is a protocol error. `local` holds the locally
/// computed task to use when a successful result carries no row (updates),
/// or `None` when the row is required (creates).
fn collect_outcome(
    results: Vec<RecordResult<TaskRecord>>,
    local: Vec<Option<Task>>,
) -> Result<BulkOutcome<Task>> {
    if results.len() > local.len() {
        return Err(TaskError::remote(format!(
            "record API returned {} results for {} records",
            results.len(),
            local.len()
        )));
    }

    let mut outcome = BulkOutcome::default();
    let mut results = results.into_iter();
    for local in local {
        let Some(result) = results.next() else {
            outcome
                .failures
                .push(RecordFailure::new("record API returned no result for this record"));
            continue;
        };
        if !result.success {
            outcome.failures.push(result.failure());
            continue;
        }
        match (result.data, local) {
            (Some(record), _) => match record.into_task() {
                Ok(task) => outcome.succeeded.push(task),
                Err(e) => outcome.failures.push(RecordFailure::new(e.to_string())),
            },
            (None, Some(local)) => outcome.succeeded.push(local),
            (None, None) => outcome
                .failures
                .push(RecordFailure::new("record API did not return the created task")),
        }
    }
    Ok(outcome)
}

#[async_trait]
impl TaskStore for RemoteTaskStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let rows: Vec<TaskRecord> = self.client.query(&self.table, &self.query_for(filter)).await?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_task() {
                Ok(task) if filter.matches(&task) => tasks.push(task),
                Ok(_) => {}
                Err(e) => warn!(error = %e, table = %self.table, "skipping unreadable task row"),
            }
        }
        Ok(tasks)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        let row: Option<TaskRecord> = self.client.fetch(&self.table, id.get()).await?;
        row.map(TaskRecord::into_task).transpose()
    }

    async fn insert(&self, params: &TaskCreateParams, now: DateTime<Utc>) -> Result<Task> {
        // ID 0 is a placeholder; the API assigns the real one
        let draft = Task::from_params(TaskId::new(0), params, now);
        let results: Vec<RecordResult<TaskRecord>> = self
            .client
            .create(&self.table, &[TaskRecord::for_create(&draft)])
            .await?;
        match single(results)? {
            Some(record) => record.into_task(),
            None => Err(TaskError::remote(
                "record API did not return the created task",
            )),
        }
    }

    async fn insert_many(
        &self,
        params: &[TaskCreateParams],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>> {
        let drafts: Vec<Task> = params
            .iter()
            .map(|p| Task::from_params(TaskId::new(0), p, now))
            .collect();
        let records: Vec<TaskRecord> = drafts.iter().map(TaskRecord::for_create).collect();
        let results: Vec<RecordResult<TaskRecord>> =
            self.client.create(&self.table, &records).await?;
        collect_outcome(results, vec![None; drafts.len()])
    }

    async fn update(
        &self,
        id: TaskId,
        updates: &TaskUpdateParams,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        let Some(mut task) = self.get(id).await? else {
            return Ok(None);
        };
        task.apply(updates, now);
        self.patch(&task).await.map(Some)
    }

    async fn update_many(
        &self,
        updates: &[(TaskId, TaskUpdateParams)],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>> {
        let mut outcome = BulkOutcome::default();
        let mut pending = Vec::with_capacity(updates.len());
        for (id, params) in updates {
            match self.get(*id).await? {
                Some(mut task) => {
                    task.apply(params, now);
                    pending.push(task);
                }
                None => outcome
                    .failures
                    .push(RecordFailure::new(format!("Task not found: {id}"))),
            }
        }
        if pending.is_empty() {
            return Ok(outcome);
        }

        let records: Vec<TaskRecord> = pending.iter().map(TaskRecord::from).collect();
        let results = self.client.update(&self.table, &records).await?;
        outcome.merge(collect_outcome(
            results,
            pending.into_iter().map(Some).collect(),
        )?);
        Ok(outcome)
    }

    async fn set_archived(&self, id: TaskId, archived: bool) -> Result<Option<Task>> {
        let Some(mut task) = self.get(id).await? else {
            return Ok(None);
        };
        task.archived = archived;
        self.patch(&task).await.map(Some)
    }

    async fn delete(&self, id: TaskId) -> Result<Option<Task>> {
        let Some(task) = self.get(id).await? else {
            return Ok(None);
        };
        let _ = single(self.client.delete(&self.table, &[id.get()]).await?)?;
        Ok(Some(task))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories
// ─────────────────────────────────────────────────────────────────────────────

/// Category store over the record-table API.
pub struct RemoteCategoryStore {
    client: Arc<RecordClient>,
    table: String,
    page_limit: u32,
}

impl RemoteCategoryStore {
    /// Store using `settings.category_table`.
    pub fn new(client: Arc<RecordClient>, settings: &RemoteSettings) -> Self {
        Self {
            client,
            table: settings.category_table.clone(),
            page_limit: settings.page_limit,
        }
    }
}

#[async_trait]
impl CategoryStore for RemoteCategoryStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let query = QueryRequest::new(CATEGORY_FIELDS, self.page_limit);
        let rows: Vec<CategoryRecord> = self.client.query(&self.table, &query).await?;
        rows.into_iter().map(CategoryRecord::into_category).collect()
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        let row: Option<CategoryRecord> = self.client.fetch(&self.table, id.get()).await?;
        row.map(CategoryRecord::into_category).transpose()
    }

    async fn insert(&self, params: &CategoryCreateParams) -> Result<Category> {
        let record = CategoryRecord {
            id: None,
            name: Some(params.name.trim().to_owned()),
            color_c: Some(params.color.clone()),
        };
        let results = self.client.create(&self.table, &[record]).await?;
        match single::<CategoryRecord>(results)? {
            Some(record) => record.into_category(),
            None => Err(TaskError::remote(
                "record API did not return the created category",
            )),
        }
    }

    async fn update(
        &self,
        id: CategoryId,
        updates: &CategoryUpdateParams,
    ) -> Result<Option<Category>> {
        let Some(mut category) = self.get(id).await? else {
            return Ok(None);
        };
        updates.apply_to(&mut category);
        let results = self
            .client
            .update(&self.table, &[CategoryRecord::from(&category)])
            .await?;
        match single::<CategoryRecord>(results)? {
            Some(record) => record.into_category().map(Some),
            None => Ok(Some(category)),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<Option<Category>> {
        let Some(category) = self.get(id).await? else {
            return Ok(None);
        };
        let _ = single(self.client.delete(&self.table, &[id.get()]).await?)?;
        Ok(Some(category))
    }
}
