//! # taskflow-settings
//!
//! Layered configuration for TaskFlow.
//!
//! Settings resolve in three layers, later ones winning:
//! compiled defaults, `~/.taskflow/settings.json`, then `TASKFLOW_*`
//! environment variables. The merged result is validated before use.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{
    BackendKind, BackendSettings, EmbedSettings, LatencySettings, LoggingSettings,
    RemoteSettings, TaskflowSettings, ViewSettings,
};
