//! # taskflow-view
//!
//! Screen state for TaskFlow and the startup sequence that wires it up.
//!
//! - [`controller`]: the task list (loading, mutations, presentation state)
//! - [`sidebar`]: category navigation with the "All Tasks" entry
//! - [`modal`]: the create/edit form
//! - [`debounce`]: search-box debounce
//! - [`notifications`]: user-facing toasts
//! - [`app`]: settings → handshake → services → screens

#![deny(unsafe_code)]

pub mod app;
pub mod controller;
pub mod debounce;
pub mod errors;
pub mod modal;
pub mod notifications;
pub mod sidebar;

pub use app::{App, RunMode, Screen, init_logging};
pub use controller::{EmptyState, TaskListController};
pub use debounce::SearchDebounce;
pub use errors::{AppError, Result, ViewError};
pub use modal::{ModalState, TaskForm};
pub use notifications::{Notification, NotificationKind, Notifications};
pub use sidebar::{CategorySidebar, SidebarEntry};
