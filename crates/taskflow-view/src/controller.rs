//! Task list screen state.
//!
//! [`TaskListController`] owns everything the task list renders: the route,
//! the loaded tasks and the visible list derived from them, the search/status/
//! sort inputs, the modal, and the loading and error flags. Every mutation
//! goes through the [`Services`] container and is reconciled locally by ID on
//! success; failures are logged, turned into a notification, and leave the
//! current state alone.
//!
//! Responses are applied in arrival order with no cancellation, so a slow
//! reload can overwrite a newer one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use taskflow_core::{
    Category, DemoCredentials, DemoUser, Route, SortKey, StatusFilter, Task, TaskId, TaskStatus,
    TaskUpdateParams, ViewQuery, visible_tasks,
};
use taskflow_embed::HostNotifier;
use taskflow_settings::ViewSettings;
use taskflow_tasks::{Services, TaskError};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::debounce::SearchDebounce;
use crate::errors::{Result, ViewError};
use crate::modal::{ModalState, TaskForm};
use crate::notifications::Notifications;

/// Shown in place of the list when loading fails.
pub const LOAD_ERROR: &str = "Failed to load tasks";
/// Header on the root route.
pub const ALL_TASKS_TITLE: &str = "All Tasks";
/// Header when the routed category is not loaded.
pub const UNKNOWN_CATEGORY: &str = "Unknown";
/// Rejection for a submit while the modal is closed.
pub const NO_OPEN_FORM: &str = "No task form is open";

// ─────────────────────────────────────────────────────────────────────────────
// Empty state
// ─────────────────────────────────────────────────────────────────────────────

/// Why the visible list is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum EmptyState {
    /// The search matched nothing.
    Search,
    /// The status filter matched nothing.
    Status(TaskStatus),
    /// The routed category has no tasks.
    Category,
    /// There are no tasks at all.
    Tasks,
}

impl EmptyState {
    /// Wire name (`search`, a status, `category`, `tasks`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Status(status) => status.as_str(),
            Self::Category => "category",
            Self::Tasks => "tasks",
        }
    }

    /// Headline for the placeholder.
    pub fn title(self) -> &'static str {
        match self {
            Self::Search => "No results found",
            Self::Status(TaskStatus::Completed) => "No completed tasks",
            Self::Status(_) => "Nothing here yet",
            Self::Category => "No tasks in this category",
            Self::Tasks => "No tasks yet",
        }
    }

    /// Supporting text for the placeholder.
    pub fn description(self) -> &'static str {
        match self {
            Self::Search => "Try adjusting your search terms or browse all tasks.",
            Self::Status(TaskStatus::Completed) => {
                "Tasks you complete will appear here. Keep up the great work!"
            }
            Self::Status(_) => "Get started by adding some content.",
            Self::Category => "Add tasks to this category to see them here.",
            Self::Tasks => "Create your first task to get started with organizing your work.",
        }
    }
}

impl From<EmptyState> for &'static str {
    fn from(state: EmptyState) -> Self {
        state.as_str()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// State and operations of the task list screen.
pub struct TaskListController {
    services: Services,
    credentials: watch::Receiver<DemoCredentials>,
    host: Arc<HostNotifier>,
    notifications: Notifications,
    route: Route,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    visible: Vec<Task>,
    query: ViewQuery,
    search: SearchDebounce,
    modal: ModalState,
    category_options: Vec<Category>,
    loading: bool,
    load_error: Option<String>,
}

impl TaskListController {
    /// Controller on the root route. Nothing is loaded until
    /// [`navigate`](Self::navigate) or [`reload`](Self::reload).
    pub fn new(
        services: Services,
        credentials: watch::Receiver<DemoCredentials>,
        host: Arc<HostNotifier>,
        settings: &ViewSettings,
    ) -> Self {
        Self {
            services,
            credentials,
            host,
            notifications: Notifications::new(),
            route: Route::AllTasks,
            tasks: Vec::new(),
            categories: Vec::new(),
            visible: Vec::new(),
            query: ViewQuery {
                search: String::new(),
                status: settings.default_status,
                sort: settings.default_sort,
            },
            search: SearchDebounce::new(Duration::from_millis(settings.search_debounce_ms)),
            modal: ModalState::Closed,
            category_options: Vec::new(),
            loading: true,
            load_error: None,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    /// Current route.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Loaded tasks, before search/status/sort.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks as rendered.
    pub fn visible(&self) -> &[Task] {
        &self.visible
    }

    /// Categories known to the header.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Applied search, status and sort.
    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    /// Search text as typed, possibly not yet applied.
    pub fn search_draft(&self) -> &str {
        self.search.draft()
    }

    /// Modal state.
    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    /// Categories offered by the open modal's dropdown.
    pub fn category_options(&self) -> &[Category] {
        &self.category_options
    }

    /// Whether a task load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load, cleared by the next load.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The notification sink. Clone it to observe from elsewhere.
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Whether the app runs inside a host page.
    pub fn is_embedded(&self) -> bool {
        self.host.is_embedded()
    }

    fn current_user(&self) -> DemoUser {
        self.credentials.borrow().user.clone()
    }

    // ── loading ──────────────────────────────────────────────────────────────

    /// Switch route and reload.
    pub async fn navigate(&mut self, route: Route) {
        debug!(%route, "navigating");
        self.route = route;
        self.reload().await;
    }

    /// Reload tasks and categories for the current route.
    pub async fn reload(&mut self) {
        self.load_tasks().await;
        self.load_categories().await;
    }

    async fn load_tasks(&mut self) {
        self.load_error = None;
        self.loading = true;

        let loaded = match self.route {
            Route::AllTasks => self
                .services
                .tasks
                .get_all()
                .await
                .map(|tasks| tasks.into_iter().filter(|t| !t.archived).collect()),
            Route::Category(id) => self.services.tasks.get_by_category(id).await,
        };

        match loaded {
            Ok(mut tasks) => {
                if self.is_embedded() {
                    let user_id = self.credentials.borrow().user.id.clone();
                    tasks.retain(|t| t.visible_to(&user_id));
                }
                debug!(route = %self.route, count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
                self.refresh();
                let user = self.current_user();
                let _ = self.host.ready(&user).await;
            }
            Err(e) => {
                error!(route = %self.route, error = %e, "failed to load tasks");
                self.load_error = Some(LOAD_ERROR.to_owned());
                self.host.error(&e.to_string()).await;
            }
        }
        self.loading = false;
    }

    async fn load_categories(&mut self) {
        match self.services.categories.get_all().await {
            Ok(categories) => self.categories = categories,
            Err(e) => error!(error = %e, "failed to load categories"),
        }
    }

    fn refresh(&mut self) {
        self.visible = visible_tasks(&self.tasks, &self.query);
    }

    // ── query inputs ─────────────────────────────────────────────────────────

    /// Record search-box input. Applied after the debounce delay by
    /// [`settle_search`](Self::settle_search) or
    /// [`poll_search`](Self::poll_search).
    pub fn type_search(&mut self, text: impl Into<String>) {
        self.search.input(text);
    }

    /// Wait for pending search input and apply it. Returns whether anything
    /// was applied.
    pub async fn settle_search(&mut self) -> bool {
        let Some(applied) = self.search.settled().await else {
            return false;
        };
        applied.clone_into(&mut self.query.search);
        self.refresh();
        true
    }

    /// Apply pending search input if its delay has passed.
    pub fn poll_search(&mut self) -> bool {
        let Some(applied) = self.search.poll_elapsed() else {
            return false;
        };
        applied.clone_into(&mut self.query.search);
        self.refresh();
        true
    }

    /// Clear the search box, bypassing the debounce.
    pub fn clear_search(&mut self) {
        self.search.clear();
        self.query.search.clear();
        self.refresh();
    }

    /// Change the status filter.
    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.query.status = status;
        self.refresh();
    }

    /// Change the sort order.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.query.sort = sort;
        self.refresh();
    }

    // ── local reconciliation ─────────────────────────────────────────────────

    fn replace(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
        self.refresh();
    }

    fn remove(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
        self.refresh();
    }

    fn prepend(&mut self, task: Task) {
        self.tasks.insert(0, task);
        self.refresh();
    }

    // ── status ───────────────────────────────────────────────────────────────

    /// Set a task's status.
    pub async fn change_status(&mut self, id: TaskId, status: TaskStatus) -> Result<Task> {
        match self
            .services
            .tasks
            .update(id, &TaskUpdateParams::status(status))
            .await
        {
            Ok(task) => {
                if task.status == TaskStatus::Completed {
                    self.notifications.success("Task completed! 🎉");
                } else {
                    self.notifications.info("Task status updated");
                }
                self.replace(task.clone());
                Ok(task)
            }
            Err(e) => {
                error!(task_id = %id, error = %e, "failed to update task status");
                self.notifications.error("Failed to update task status");
                Err(e.into())
            }
        }
    }

    /// Advance a loaded task to its next status
    /// (pending → in-progress → completed → pending).
    pub async fn toggle(&mut self, id: TaskId) -> Result<Task> {
        let Some(next) = self
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status.cycled())
        else {
            warn!(task_id = %id, "toggle on a task that is not loaded");
            self.notifications.error("Failed to update task status");
            return Err(TaskError::task_not_found(id).into());
        };
        self.change_status(id, next).await
    }

    // ── modal ────────────────────────────────────────────────────────────────

    /// Open the modal for a new task.
    pub async fn open_create(&mut self) {
        self.modal = ModalState::Create;
        self.load_category_options().await;
    }

    /// Open the modal to edit `task`.
    pub async fn open_edit(&mut self, task: Task) {
        self.modal = ModalState::Edit(Box::new(task));
        self.load_category_options().await;
    }

    /// Close the modal without saving.
    pub fn close(&mut self) {
        self.modal = ModalState::Closed;
        self.category_options.clear();
    }

    /// A failed load leaves the dropdown empty; the form stays usable.
    async fn load_category_options(&mut self) {
        match self.services.categories.get_all().await {
            Ok(categories) => self.category_options = categories,
            Err(e) => {
                error!(error = %e, "failed to load categories for task form");
                self.category_options.clear();
            }
        }
    }

    /// Save the modal's form.
    ///
    /// A blank title is rejected before anything is sent, as is a submit
    /// with the modal closed. On success the modal closes; on failure it
    /// stays open and the error is returned.
    pub async fn submit(&mut self, form: &TaskForm) -> Result<Task> {
        if !self.modal.is_open() {
            warn!("submit with no task form open");
            return Err(ViewError::Form(NO_OPEN_FORM.to_owned()));
        }
        let owner = self.is_embedded().then(|| self.current_user());
        let editing = self.modal.editing().map(|t| t.id);

        let saved = match editing {
            Some(id) => {
                let updates = form.to_update_params(owner.as_ref())?;
                self.services.tasks.update(id, &updates).await
            }
            None => {
                let params = form.to_create_params(owner.as_ref())?;
                self.services.tasks.create(&params).await
            }
        };

        let task = match saved {
            Ok(task) => task,
            Err(e) => {
                error!(error = %e, "failed to save task");
                self.notifications.error("Failed to save task");
                return Err(e.into());
            }
        };

        if editing.is_some() {
            self.replace(task.clone());
            self.notifications.success("Task updated successfully");
        } else {
            self.prepend(task.clone());
            self.notifications.success("Task created successfully");
            let user = self.current_user();
            self.host.task_created(&task, &user).await;
        }
        self.close();
        Ok(task)
    }

    // ── removal ──────────────────────────────────────────────────────────────

    /// Delete a task permanently.
    pub async fn delete(&mut self, id: TaskId) -> Result<Task> {
        match self.services.tasks.delete(id).await {
            Ok(task) => {
                self.remove(id);
                self.notifications.success("Task deleted");
                Ok(task)
            }
            Err(e) => {
                error!(task_id = %id, error = %e, "failed to delete task");
                self.notifications.error("Failed to delete task");
                Err(e.into())
            }
        }
    }

    /// Archive a task, hiding it from every listing.
    pub async fn archive(&mut self, id: TaskId) -> Result<Task> {
        match self.services.tasks.archive(id).await {
            Ok(task) => {
                self.remove(id);
                self.notifications.success("Task archived");
                Ok(task)
            }
            Err(e) => {
                error!(task_id = %id, error = %e, "failed to archive task");
                self.notifications.error("Failed to archive task");
                Err(e.into())
            }
        }
    }

    // ── presentation ─────────────────────────────────────────────────────────

    /// Page heading.
    pub fn header_title(&self) -> &str {
        match self.route {
            Route::AllTasks => ALL_TASKS_TITLE,
            Route::Category(id) => self
                .categories
                .iter()
                .find(|c| c.id == id)
                .map_or(UNKNOWN_CATEGORY, |c| c.name.as_str()),
        }
    }

    /// "1 task" / "N tasks" for the visible list.
    pub fn count_label(&self) -> String {
        match self.visible.len() {
            1 => "1 task".to_owned(),
            n => format!("{n} tasks"),
        }
    }

    /// Placeholder to show, or `None` when the visible list has tasks.
    pub fn empty_state(&self) -> Option<EmptyState> {
        if !self.visible.is_empty() {
            return None;
        }
        Some(if self.query.has_search() {
            EmptyState::Search
        } else if let StatusFilter::Only(status) = self.query.status {
            EmptyState::Status(status)
        } else if matches!(self.route, Route::Category(_)) {
            EmptyState::Category
        } else {
            EmptyState::Tasks
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
