use async_trait::async_trait;
use parking_lot::RwLock;
use taskflow_core::{Category, CategoryCreateParams, CategoryId, CategoryUpdateParams};
use taskflow_settings::LatencySettings;

use super::simulate_latency;
use crate::errors::Result;
use crate::store::CategoryStore;

/// Mock category store.
pub struct MemoryCategoryStore {
    categories: RwLock<Vec<Category>>,
    latency: LatencySettings,
}

impl MemoryCategoryStore {
    /// Empty store.
    pub fn new(latency: LatencySettings) -> Self {
        Self::with_categories(Vec::new(), latency)
    }

    /// Store preloaded with `categories`.
    pub fn with_categories(categories: Vec<Category>, latency: LatencySettings) -> Self {
        Self {
            categories: RwLock::new(categories),
            latency,
        }
    }

    /// Store preloaded with the bundled fixtures.
    pub fn seeded(latency: LatencySettings) -> Result<Self> {
        Ok(Self::with_categories(super::seed_categories()?, latency))
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Category>> {
        simulate_latency(self.latency.category_list_ms).await;
        Ok(self.categories.read().clone())
    }

    async fn get(&self, id: CategoryId) -> Result<Option<Category>> {
        simulate_latency(self.latency.category_get_ms).await;
        Ok(self.categories.read().iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, params: &CategoryCreateParams) -> Result<Category> {
        simulate_latency(self.latency.category_create_ms).await;
        let mut categories = self.categories.write();
        let category = Category {
            id: CategoryId::next_after(categories.iter().map(|c| c.id)),
            name: params.name.trim().to_owned(),
            color: params.color.clone(),
            task_count: 0,
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: CategoryId,
        updates: &CategoryUpdateParams,
    ) -> Result<Option<Category>> {
        simulate_latency(self.latency.category_update_ms).await;
        let mut categories = self.categories.write();
        Ok(categories.iter_mut().find(|c| c.id == id).map(|category| {
            updates.apply_to(category);
            category.clone()
        }))
    }

    async fn delete(&self, id: CategoryId) -> Result<Option<Category>> {
        simulate_latency(self.latency.category_delete_ms).await;
        let mut categories = self.categories.write();
        Ok(categories
            .iter()
            .position(|c| c.id == id)
            .map(|index| categories.remove(index)))
    }
}
