//! # taskflow-tasks
//!
//! Task and category management over a pluggable record store.
//!
//! - [`store`]: the async store port and listing filters
//! - [`memory`]: the seeded in-memory mock with simulated latency
//! - [`remote`]: the record-table HTTP backend
//! - [`service`]: validation and not-found rules on top of a store
//! - [`container`]: the [`Services`] bundle built from settings

#![deny(unsafe_code)]

pub mod container;
pub mod errors;
pub mod memory;
pub mod remote;
pub mod service;
pub mod store;

pub use container::Services;
pub use errors::{FieldError, RecordFailure, Result, TaskError};
pub use service::{CategoryService, TaskService};
pub use store::{BulkOutcome, CategoryStore, TaskFilter, TaskStore};
