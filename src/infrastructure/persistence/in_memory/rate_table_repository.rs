//! # In-Memory Rate Table Repository
//!
//! In-memory implementation of [`RateTableRepository`] for tests and
//! the default binary wiring.

use crate::domain::entities::rate_entry::RateTableEntry;
use crate::domain::value_objects::{RateEntryId, ServiceCategory};
use crate::infrastructure::persistence::traits::{RateTableRepository, RepositoryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`RateTableRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateTableRepository {
    storage: Arc<RwLock<HashMap<RateEntryId, RateTableEntry>>>,
}

impl InMemoryRateTableRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl RateTableRepository for InMemoryRateTableRepository {
    async fn save(&self, entry: &RateTableEntry) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        storage.insert(entry.id(), entry.clone());
        Ok(())
    }

    async fn get(&self, id: &RateEntryId) -> RepositoryResult<Option<RateTableEntry>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_active(&self) -> RepositoryResult<Vec<RateTableEntry>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect())
    }

    async fn find_by_category(
        &self,
        category: ServiceCategory,
    ) -> RepositoryResult<Vec<RateTableEntry>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|e| e.service_category() == category)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &RateEntryId) -> RepositoryResult<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.remove(id).is_some())
    }
}
