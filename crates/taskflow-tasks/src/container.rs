//! Service container built once at startup.

use std::sync::Arc;

use taskflow_settings::{BackendKind, BackendSettings};
use tracing::info;

use crate::errors::Result;
use crate::memory::{MemoryCategoryStore, MemoryTaskStore};
use crate::remote::{RecordClient, RemoteCategoryStore, RemoteTaskStore};
use crate::service::{CategoryService, TaskService};
use crate::store::{CategoryStore, TaskStore};

/// Task and category services sharing one backend.
///
/// Cheap to clone; clones share the same stores.
#[derive(Clone)]
pub struct Services {
    /// Task operations.
    pub tasks: TaskService,
    /// Category operations.
    pub categories: CategoryService,
}

impl Services {
    /// Build services over explicit stores.
    pub fn new(tasks: Arc<dyn TaskStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self {
            tasks: TaskService::new(Arc::clone(&tasks)),
            categories: CategoryService::new(categories, tasks),
        }
    }

    /// Build the backend selected by `settings.kind`.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self> {
        match settings.kind {
            BackendKind::Mock => {
                let (tasks, categories) = if settings.seed {
                    (
                        MemoryTaskStore::seeded(settings.latency.clone())?,
                        MemoryCategoryStore::seeded(settings.latency.clone())?,
                    )
                } else {
                    (
                        MemoryTaskStore::new(settings.latency.clone()),
                        MemoryCategoryStore::new(settings.latency.clone()),
                    )
                };
                info!(seeded = settings.seed, "using in-memory task store");
                Ok(Self::new(Arc::new(tasks), Arc::new(categories)))
            }
            BackendKind::Remote => {
                let client = Arc::new(RecordClient::new(&settings.remote)?);
                info!(base_url = %settings.remote.base_url, "using remote record store");
                Ok(Self::new(
                    Arc::new(RemoteTaskStore::new(Arc::clone(&client), &settings.remote)),
                    Arc::new(RemoteCategoryStore::new(client, &settings.remote)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_settings::{LatencySettings, RemoteSettings};

    #[tokio::test]
    async fn mock_backend_is_seeded() {
        let settings = BackendSettings {
            latency: LatencySettings::none(),
            ..BackendSettings::default()
        };
        let services = Services::from_settings(&settings).unwrap();
        assert_eq!(services.tasks.get_all().await.unwrap().len(), 9);
        assert_eq!(services.categories.get_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn unseeded_mock_is_empty() {
        let settings = BackendSettings {
            seed: false,
            latency: LatencySettings::none(),
            ..BackendSettings::default()
        };
        let services = Services::from_settings(&settings).unwrap();
        assert!(services.tasks.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let settings = BackendSettings {
            latency: LatencySettings::none(),
            ..BackendSettings::default()
        };
        let services = Services::from_settings(&settings).unwrap();
        let other = services.clone();
        let _ = other.tasks.archive(taskflow_core::TaskId::new(1)).await.unwrap();
        let task = services
            .tasks
            .get_by_id(taskflow_core::TaskId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert!(task.archived);
    }

    #[test]
    fn remote_backend_builds() {
        let settings = BackendSettings {
            kind: BackendKind::Remote,
            remote: RemoteSettings {
                base_url: "http://127.0.0.1:9".into(),
                ..RemoteSettings::default()
            },
            ..BackendSettings::default()
        };
        assert!(Services::from_settings(&settings).is_ok());
    }
}
