//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON file
//! format, and `#[serde(default)]` so a partial file only overrides what it
//! names.

use serde::{Deserialize, Serialize};
use taskflow_core::{DemoCredentials, SortKey, StatusFilter};

use crate::errors::{Result, SettingsError};

/// Root settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskflowSettings {
    /// Where tasks and categories live.
    pub backend: BackendSettings,
    /// Embedded-mode handshake.
    pub embed: EmbedSettings,
    /// List view behavior.
    pub view: ViewSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl TaskflowSettings {
    /// Reject combinations the services can't run with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.kind == BackendKind::Remote && self.backend.remote.base_url.trim().is_empty()
        {
            return Err(SettingsError::InvalidValue(
                "backend.remote.baseUrl is required for the remote backend".to_string(),
            ));
        }
        if self.backend.remote.page_limit == 0 {
            return Err(SettingsError::InvalidValue(
                "backend.remote.pageLimit must be greater than 0".to_string(),
            ));
        }
        if self.embed.handshake_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "embed.handshakeTimeoutMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-memory store with simulated latency.
    #[default]
    Mock,
    /// Remote record-table API.
    Remote,
}

/// Backend settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendSettings {
    /// Which store to construct.
    pub kind: BackendKind,
    /// Seed the mock store with the bundled fixtures.
    pub seed: bool,
    /// Simulated latency for the mock store.
    pub latency: LatencySettings,
    /// Remote record-table API.
    pub remote: RemoteSettings,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            kind: BackendKind::Mock,
            seed: true,
            latency: LatencySettings::default(),
            remote: RemoteSettings::default(),
        }
    }
}

/// Simulated per-operation latency of the mock store, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatencySettings {
    /// Unfiltered task listing.
    pub task_list_ms: u64,
    /// Single task lookup.
    pub task_get_ms: u64,
    /// Listing by category or status.
    pub task_filter_ms: u64,
    /// Text search.
    pub task_search_ms: u64,
    /// Task creation.
    pub task_create_ms: u64,
    /// Task update.
    pub task_update_ms: u64,
    /// Delete, archive, restore.
    pub task_remove_ms: u64,
    /// Category listing.
    pub category_list_ms: u64,
    /// Single category lookup.
    pub category_get_ms: u64,
    /// Category creation.
    pub category_create_ms: u64,
    /// Category update.
    pub category_update_ms: u64,
    /// Category deletion.
    pub category_delete_ms: u64,
}

impl LatencySettings {
    /// No simulated latency at all.
    pub fn none() -> Self {
        Self {
            task_list_ms: 0,
            task_get_ms: 0,
            task_filter_ms: 0,
            task_search_ms: 0,
            task_create_ms: 0,
            task_update_ms: 0,
            task_remove_ms: 0,
            category_list_ms: 0,
            category_get_ms: 0,
            category_create_ms: 0,
            category_update_ms: 0,
            category_delete_ms: 0,
        }
    }
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            task_list_ms: 300,
            task_get_ms: 200,
            task_filter_ms: 250,
            task_search_ms: 300,
            task_create_ms: 300,
            task_update_ms: 250,
            task_remove_ms: 200,
            category_list_ms: 250,
            category_get_ms: 200,
            category_create_ms: 300,
            category_update_ms: 250,
            category_delete_ms: 200,
        }
    }
}

/// Remote record-table API settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSettings {
    /// Base URL, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Table holding task records.
    pub task_table: String,
    /// Table holding category records.
    pub category_table: String,
    /// Fixed page size for listings; nothing past it is fetched.
    pub page_limit: u32,
    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            task_table: "task".to_string(),
            category_table: "category".to_string(),
            page_limit: 100,
            timeout_ms: 10_000,
        }
    }
}

/// Embedded-mode settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedSettings {
    /// How long to wait for the host to answer the credentials request.
    pub handshake_timeout_ms: u64,
    /// Credentials used standalone or when the host never answers.
    pub fallback_credentials: DemoCredentials,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: 3_000,
            fallback_credentials: DemoCredentials::fallback(),
        }
    }
}

/// List view settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewSettings {
    /// Quiet period before a typed search is applied.
    pub search_debounce_ms: u64,
    /// Initial sort.
    pub default_sort: SortKey,
    /// Initial status filter.
    pub default_status: StatusFilter,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            default_sort: SortKey::Created,
            default_status: StatusFilter::All,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
