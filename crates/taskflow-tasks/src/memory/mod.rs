//! In-memory mock store.
//!
//! Holds tasks and categories in `parking_lot` locks and sleeps before every
//! operation to mimic a network round trip. Locks are only held across the
//! synchronous section after the sleep, never across an `.await`.

mod categories;
mod tasks;

use std::time::Duration;

use taskflow_core::{Category, Task};

use crate::errors::Result;

pub use categories::MemoryCategoryStore;
pub use tasks::MemoryTaskStore;

const SEED_TASKS: &str = include_str!("../../fixtures/tasks.json");
const SEED_CATEGORIES: &str = include_str!("../../fixtures/categories.json");

/// Parse the bundled task fixtures.
pub fn seed_tasks() -> Result<Vec<Task>> {
    Ok(serde_json::from_str(SEED_TASKS)?)
}

/// Parse the bundled category fixtures.
pub fn seed_categories() -> Result<Vec<Category>> {
    Ok(serde_json::from_str(SEED_CATEGORIES)?)
}

async fn simulate_latency(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::TaskStatus;

    #[test]
    fn fixtures_parse() {
        let tasks = seed_tasks().unwrap();
        let categories = seed_categories().unwrap();
        assert_eq!(tasks.len(), 9);
        assert_eq!(categories.len(), 4);
        assert!(
            tasks
                .iter()
                .all(|t| (t.status == TaskStatus::Completed) == t.completed_at.is_some())
        );
        assert!(
            tasks
                .iter()
                .all(|t| categories.iter().any(|c| c.id == t.category_id))
        );
    }
}
