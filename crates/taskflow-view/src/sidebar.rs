//! Category navigation.

use serde::Serialize;
use taskflow_core::{Category, Route};
use taskflow_tasks::CategoryService;
use tracing::{debug, error};

/// Colour of the synthetic "All Tasks" entry.
pub const ALL_TASKS_COLOR: &str = "#6B7280";
/// Shown in place of the sidebar when loading fails.
pub const LOAD_ERROR: &str = "Failed to load categories";

/// One row of the sidebar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    /// Where the row navigates.
    #[serde(serialize_with = "route_path")]
    pub route: Route,
    /// Label.
    pub name: String,
    /// Hex colour.
    pub color: String,
    /// Non-archived tasks behind the row.
    pub task_count: usize,
    /// Whether this is the current route.
    pub active: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn route_path<S: serde::Serializer>(route: &Route, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(route)
}

/// Sidebar listing every category behind an "All Tasks" entry.
pub struct CategorySidebar {
    categories: CategoryService,
    loaded: Vec<Category>,
    loading: bool,
    error: Option<String>,
}

impl CategorySidebar {
    /// Sidebar over `categories`; call [`load`](Self::load) before rendering.
    pub fn new(categories: CategoryService) -> Self {
        Self {
            categories,
            loaded: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// Fetch categories with their task counts.
    pub async fn load(&mut self) {
        self.error = None;
        self.loading = true;
        match self.categories.get_all().await {
            Ok(categories) => {
                debug!(count = categories.len(), "categories loaded");
                self.loaded = categories;
            }
            Err(e) => {
                error!(error = %e, "failed to load categories");
                self.error = Some(LOAD_ERROR.to_owned());
            }
        }
        self.loading = false;
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Loaded categories, without the synthetic entry.
    pub fn categories(&self) -> &[Category] {
        &self.loaded
    }

    /// Rows to render, with the entry for `current` marked active.
    pub fn entries(&self, current: Route) -> Vec<SidebarEntry> {
        let all = SidebarEntry {
            route: Route::AllTasks,
            name: "All Tasks".to_owned(),
            color: ALL_TASKS_COLOR.to_owned(),
            task_count: self.loaded.iter().map(|c| c.task_count).sum(),
            active: current == Route::AllTasks,
        };
        std::iter::once(all)
            .chain(self.loaded.iter().map(|c| SidebarEntry {
                route: Route::Category(c.id),
                name: c.name.clone(),
                color: c.color.clone(),
                task_count: c.task_count,
                active: current.category_id() == Some(c.id),
            }))
            .collect()
    }
}
