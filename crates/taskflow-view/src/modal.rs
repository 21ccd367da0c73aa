//! Task create/edit form and modal state.

use serde::{Deserialize, Serialize};
use taskflow_core::types::parse_due_date;
use taskflow_core::{
    CategoryId, DemoUser, Task, TaskCreateParams, TaskPriority, TaskStatus, TaskUpdateParams,
};

use crate::errors::{Result, ViewError};

/// Form fields as the user edits them.
///
/// `category_id` and `due_date` stay strings until submit, matching the
/// select and date inputs; an empty due date means none.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskForm {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Selected category ID.
    pub category_id: String,
    /// Priority.
    pub priority: TaskPriority,
    /// Status.
    pub status: TaskStatus,
    /// `YYYY-MM-DD`, or empty.
    pub due_date: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category_id: CategoryId::default().to_string(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            due_date: String::new(),
        }
    }
}

impl TaskForm {
    /// Form with `title` and defaults elsewhere.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            category_id: task.category_id.to_string(),
            priority: task.priority,
            status: task.status,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    fn parsed(&self) -> Result<(CategoryId, Option<chrono::NaiveDate>)> {
        if self.title.trim().is_empty() {
            return Err(ViewError::Form("Title is required".to_owned()));
        }
        let category_id = self
            .category_id
            .parse::<CategoryId>()
            .map_err(|e| ViewError::Form(e.to_string()))?;
        let due_date = if self.due_date.trim().is_empty() {
            None
        } else {
            Some(parse_due_date(&self.due_date).map_err(|e| ViewError::Form(e.to_string()))?)
        };
        Ok((category_id, due_date))
    }

    /// Creation params, stamped with the owner when `owner` is given.
    pub fn to_create_params(&self, owner: Option<&DemoUser>) -> Result<TaskCreateParams> {
        let (category_id, due_date) = self.parsed()?;
        Ok(TaskCreateParams {
            title: self.title.clone(),
            description: self.description.clone(),
            category_id,
            priority: Some(self.priority),
            status: Some(self.status),
            due_date,
            demo_user_id: owner.map(|u| u.id.clone()),
            created_by: owner.map(|u| u.name.clone()),
        })
    }

    /// Update params that overwrite every editable field.
    pub fn to_update_params(&self, owner: Option<&DemoUser>) -> Result<TaskUpdateParams> {
        let (category_id, due_date) = self.parsed()?;
        Ok(TaskUpdateParams {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            category_id: Some(category_id),
            priority: Some(self.priority),
            status: Some(self.status),
            due_date: Some(due_date),
            demo_user_id: owner.map(|u| u.id.clone()),
            created_by: owner.map(|u| u.name.clone()),
        })
    }
}

/// Whether the task modal is showing, and for what.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ModalState {
    /// Hidden.
    #[default]
    Closed,
    /// Creating a new task.
    Create,
    /// Editing an existing task.
    Edit(Box<Task>),
}

impl ModalState {
    /// Whether the modal is visible.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// The task being edited.
    pub fn editing(&self) -> Option<&Task> {
        match self {
            Self::Edit(task) => Some(task),
            _ => None,
        }
    }

    /// Initial form contents for the current mode.
    pub fn initial_form(&self) -> TaskForm {
        match self {
            Self::Edit(task) => TaskForm::from_task(task),
            _ => TaskForm::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};
    use taskflow_core::{DemoCredentials, TaskId};

    fn task() -> Task {
        let params = TaskCreateParams {
            title: "Review quarterly report".into(),
            description: "Check numbers".into(),
            category_id: CategoryId::new(3),
            priority: Some(TaskPriority::High),
            status: Some(TaskStatus::InProgress),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 14),
            ..Default::default()
        };
        Task::from_params(
            TaskId::new(12),
            &params,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn defaults() {
        let form = TaskForm::default();
        assert_eq!(form.category_id, "1");
        assert_eq!(form.priority, TaskPriority::Medium);
        assert_eq!(form.status, TaskStatus::Pending);
        assert!(form.title.is_empty());
        assert!(form.due_date.is_empty());
    }

    #[test]
    fn edit_prefills_from_task() {
        let form = ModalState::Edit(Box::new(task())).initial_form();
        assert_eq!(form.title, "Review quarterly report");
        assert_eq!(form.category_id, "3");
        assert_eq!(form.priority, TaskPriority::High);
        assert_eq!(form.status, TaskStatus::InProgress);
        assert_eq!(form.due_date, "2026-03-14");
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = TaskForm::titled("   ").to_create_params(None).unwrap_err();
        assert_matches!(err, ViewError::Form(ref m) if m == "Title is required");
    }

    #[test]
    fn empty_due_date_becomes_none() {
        let params = TaskForm::titled("Call mom").to_create_params(None).unwrap();
        assert_eq!(params.due_date, None);
        assert_eq!(params.category_id, CategoryId::new(1));
        assert_eq!(params.demo_user_id, None);

        let updates = TaskForm::titled("Call mom").to_update_params(None).unwrap();
        assert_eq!(updates.due_date, Some(None));
    }

    #[test]
    fn owner_is_stamped() {
        let user = DemoCredentials::fallback().user;
        let params = TaskForm::titled("Call mom")
            .to_create_params(Some(&user))
            .unwrap();
        assert_eq!(params.demo_user_id.as_deref(), Some("demo-user-1"));
        assert_eq!(params.created_by.as_deref(), Some("Demo User"));
    }

    #[test]
    fn bad_category_or_date() {
        let mut form = TaskForm::titled("x");
        form.category_id = "abc".into();
        assert_matches!(form.to_create_params(None), Err(ViewError::Form(_)));

        let mut form = TaskForm::titled("x");
        form.due_date = "next tuesday".into();
        assert_matches!(form.to_update_params(None), Err(ViewError::Form(_)));
    }

    #[test]
    fn form_reads_camel_case_json() {
        let form: TaskForm = serde_json::from_value(serde_json::json!({
            "title": "Buy milk",
            "categoryId": "4",
            "dueDate": "2026-05-01"
        }))
        .unwrap();
        assert_eq!(form.category_id, "4");
        assert_eq!(form.priority, TaskPriority::Medium);
        let params = form.to_create_params(None).unwrap();
        assert_eq!(params.due_date, NaiveDate::from_ymd_opt(2026, 5, 1));
    }

    #[test]
    fn modal_state_helpers() {
        assert!(!ModalState::Closed.is_open());
        assert!(ModalState::Create.is_open());
        assert!(ModalState::Create.editing().is_none());
        assert_eq!(
            ModalState::Edit(Box::new(task())).editing().map(|t| t.id),
            Some(TaskId::new(12))
        );
    }
}
