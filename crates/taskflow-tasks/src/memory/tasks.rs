use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use taskflow_core::{Task, TaskCreateParams, TaskId, TaskUpdateParams};
use taskflow_settings::LatencySettings;

use super::simulate_latency;
use crate::errors::{RecordFailure, Result};
use crate::store::{BulkOutcome, TaskFilter, TaskStore};

/// Mock task store.
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
    latency: LatencySettings,
}

impl MemoryTaskStore {
    /// Empty store.
    pub fn new(latency: LatencySettings) -> Self {
        Self::with_tasks(Vec::new(), latency)
    }

    /// Store preloaded with `tasks`.
    pub fn with_tasks(tasks: Vec<Task>, latency: LatencySettings) -> Self {
        Self {
            tasks: RwLock::new(tasks),
            latency,
        }
    }

    /// Store preloaded with the bundled fixtures.
    pub fn seeded(latency: LatencySettings) -> Result<Self> {
        Ok(Self::with_tasks(super::seed_tasks()?, latency))
    }

    /// Number of stored tasks, archived included.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Whether the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    fn list_latency(&self, filter: &TaskFilter) -> u64 {
        if filter.search.is_some() {
            self.latency.task_search_ms
        } else if filter.is_narrowed() {
            self.latency.task_filter_ms
        } else {
            self.latency.task_list_ms
        }
    }

    fn insert_locked(tasks: &mut Vec<Task>, params: &TaskCreateParams, now: DateTime<Utc>) -> Task {
        let id = TaskId::next_after(tasks.iter().map(|t| t.id));
        let task = Task::from_params(id, params, now);
        tasks.push(task.clone());
        task
    }

    fn update_locked(
        tasks: &mut [Task],
        id: TaskId,
        updates: &TaskUpdateParams,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        let task = tasks.iter_mut().find(|t| t.id == id)?;
        task.apply(updates, now);
        Some(task.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        simulate_latency(self.list_latency(filter)).await;
        Ok(self
            .tasks
            .read()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>> {
        simulate_latency(self.latency.task_get_ms).await;
        Ok(self.tasks.read().iter().find(|t| t.id == id).cloned())
    }

    async fn insert(&self, params: &TaskCreateParams, now: DateTime<Utc>) -> Result<Task> {
        simulate_latency(self.latency.task_create_ms).await;
        Ok(Self::insert_locked(&mut self.tasks.write(), params, now))
    }

    async fn insert_many(
        &self,
        params: &[TaskCreateParams],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>> {
        simulate_latency(self.latency.task_create_ms).await;
        let mut tasks = self.tasks.write();
        let succeeded = params
            .iter()
            .map(|p| Self::insert_locked(&mut tasks, p, now))
            .collect();
        Ok(BulkOutcome {
            succeeded,
            failures: Vec::new(),
        })
    }

    async fn update(
        &self,
        id: TaskId,
        updates: &TaskUpdateParams,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        simulate_latency(self.latency.task_update_ms).await;
        Ok(Self::update_locked(&mut self.tasks.write(), id, updates, now))
    }

    async fn update_many(
        &self,
        updates: &[(TaskId, TaskUpdateParams)],
        now: DateTime<Utc>,
    ) -> Result<BulkOutcome<Task>> {
        simulate_latency(self.latency.task_update_ms).await;
        let mut tasks = self.tasks.write();
        let mut outcome = BulkOutcome::default();
        for (id, params) in updates {
            match Self::update_locked(&mut tasks, *id, params, now) {
                Some(task) => outcome.succeeded.push(task),
                None => outcome
                    .failures
                    .push(RecordFailure::new(format!("Task not found: {id}"))),
            }
        }
        Ok(outcome)
    }

    async fn set_archived(&self, id: TaskId, archived: bool) -> Result<Option<Task>> {
        simulate_latency(self.latency.task_remove_ms).await;
        let mut tasks = self.tasks.write();
        Ok(tasks.iter_mut().find(|t| t.id == id).map(|task| {
            task.archived = archived;
            task.clone()
        }))
    }

    async fn delete(&self, id: TaskId) -> Result<Option<Task>> {
        simulate_latency(self.latency.task_remove_ms).await;
        let mut tasks = self.tasks.write();
        Ok(tasks
            .iter()
            .position(|t| t.id == id)
            .map(|index| tasks.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use taskflow_core::{CategoryId, TaskStatus};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn params(title: &str) -> TaskCreateParams {
        TaskCreateParams {
            title: title.into(),
            category_id: CategoryId::new(1),
            ..Default::default()
        }
    }

    fn seeded() -> MemoryTaskStore {
        MemoryTaskStore::seeded(LatencySettings::none()).unwrap()
    }

    #[tokio::test]
    async fn ids_continue_after_max() {
        let store = seeded();
        let task = store.insert(&params("New"), now()).await.unwrap();
        assert_eq!(task.id, TaskId::new(10));

        let empty = MemoryTaskStore::new(LatencySettings::none());
        assert!(empty.is_empty());
        let first = empty.insert(&params("First"), now()).await.unwrap();
        assert_eq!(first.id, TaskId::new(1));
    }

    #[tokio::test]
    async fn returned_tasks_are_copies() {
        let store = seeded();
        let mut listed = store.list(&TaskFilter::all()).await.unwrap();
        listed[0].title = "mutated".into();
        let fresh = store.get(listed[0].id).await.unwrap().unwrap();
        assert_ne!(fresh.title, "mutated");
    }

    #[tokio::test]
    async fn list_filters() {
        let store = seeded();
        assert_eq!(store.list(&TaskFilter::all()).await.unwrap().len(), 9);
        assert_eq!(store.list(&TaskFilter::default()).await.unwrap().len(), 8);
        let shopping = store
            .list(&TaskFilter::by_category(CategoryId::new(3)))
            .await
            .unwrap();
        assert_eq!(shopping.len(), 1);
        let milk = store.list(&TaskFilter::search("MILK")).await.unwrap();
        assert_eq!(milk.len(), 1);
        assert_eq!(milk[0].id, TaskId::new(6));
    }

    #[tokio::test]
    async fn update_many_reports_missing() {
        let store = seeded();
        let outcome = store
            .update_many(
                &[
                    (TaskId::new(2), TaskUpdateParams::status(TaskStatus::Completed)),
                    (TaskId::new(404), TaskUpdateParams::status(TaskStatus::Completed)),
                ],
                now(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].completed_at, Some(now()));
        assert_eq!(outcome.failures, vec![RecordFailure::new("Task not found: 404")]);
    }

    #[tokio::test]
    async fn delete_removes_and_returns() {
        let store = seeded();
        let removed = store.delete(TaskId::new(1)).await.unwrap().unwrap();
        assert_eq!(removed.id, TaskId::new(1));
        assert_eq!(store.len(), 8);
        assert!(store.delete(TaskId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn operations_take_simulated_latency() {
        let store = MemoryTaskStore::seeded(LatencySettings::default()).unwrap();
        let start = tokio::time::Instant::now();
        let _ = store.list(&TaskFilter::all()).await.unwrap();
        assert_eq!(start.elapsed().as_millis(), 300);

        let start = tokio::time::Instant::now();
        let _ = store.get(TaskId::new(1)).await.unwrap();
        assert_eq!(start.elapsed().as_millis(), 200);

        let start = tokio::time::Instant::now();
        let _ = store.list(&TaskFilter::search("run")).await.unwrap();
        assert_eq!(start.elapsed().as_millis(), 300);

        let start = tokio::time::Instant::now();
        let _ = store
            .list(&TaskFilter::by_status(TaskStatus::Pending))
            .await
            .unwrap();
        assert_eq!(start.elapsed().as_millis(), 250);
    }
}
