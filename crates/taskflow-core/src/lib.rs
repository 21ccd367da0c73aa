//! # taskflow-core
//!
//! Foundation types for TaskFlow: integer record IDs, the canonical
//! [`Task`](types::Task) and [`Category`](types::Category) shapes, demo
//! credentials, navigation routes, the filter-sort pipeline that derives the
//! visible task list, and `tracing` setup.

#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod pipeline;
pub mod route;
pub mod types;

pub use credentials::{DemoCredentials, DemoPreferences, DemoUser};
pub use errors::ParseError;
pub use ids::{CategoryId, TaskId};
pub use pipeline::{SortKey, StatusFilter, ViewQuery, visible_tasks};
pub use route::Route;
pub use types::{
    Category, CategoryCreateParams, CategoryUpdateParams, Task, TaskCreateParams, TaskPriority,
    TaskStatus, TaskUpdateParams,
};
