//! # In-Memory Saved Estimate Repository
//!
//! In-memory implementation of [`SavedEstimateRepository`], including
//! the idempotent expiry sweep.

use crate::domain::entities::saved_estimate::SavedEstimate;
use crate::domain::value_objects::{EstimateCode, EstimateId, Timestamp};
use crate::infrastructure::persistence::traits::{RepositoryResult, SavedEstimateRepository};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`SavedEstimateRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemorySavedEstimateRepository {
    storage: Arc<RwLock<HashMap<EstimateId, SavedEstimate>>>,
}

impl InMemorySavedEstimateRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SavedEstimateRepository for InMemorySavedEstimateRepository {
    async fn save(&self, estimate: &SavedEstimate) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(estimate.id(), estimate.clone());
        Ok(())
    }

    async fn find_by_code(
        &self,
        code: &EstimateCode,
    ) -> RepositoryResult<Option<SavedEstimate>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .find(|e| e.estimate_code() == code)
            .cloned())
    }

    async fn delete_sweepable(
        &self,
        now: Timestamp,
        scan_started: Timestamp,
    ) -> RepositoryResult<u64> {
        let mut storage = self.storage.write().await;
        let before = storage.len();
        storage.retain(|_, estimate| !estimate.is_sweepable(now, scan_started));
        Ok((before - storage.len()) as u64)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        Ok(storage.len() as u64)
    }
}
