//! # In-Memory Quotation Repository
//!
//! In-memory implementation of [`QuotationRepository`] with the same
//! optimistic version check a database-backed implementation performs,
//! so concurrency tests exercise the real conflict surface.

use crate::domain::entities::quotation::Quotation;
use crate::domain::value_objects::{CustomerId, QuotationId};
use crate::infrastructure::persistence::traits::{
    QuotationRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`QuotationRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuotationRepository {
    storage: Arc<RwLock<HashMap<QuotationId, Quotation>>>,
}

impl InMemoryQuotationRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn insert(&self, quotation: &Quotation) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(&quotation.id()) {
            return Err(RepositoryError::duplicate(
                "Quotation",
                quotation.id().to_string(),
            ));
        }
        storage.insert(quotation.id(), quotation.clone());
        Ok(())
    }

    async fn update(&self, quotation: &Quotation, expected_version: u64) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage.get(&quotation.id()).ok_or_else(|| {
            RepositoryError::not_found("Quotation", quotation.id().to_string())
        })?;
        if stored.version() != expected_version {
            return Err(RepositoryError::version_conflict(
                "Quotation",
                quotation.id().to_string(),
                expected_version,
                stored.version(),
            ));
        }
        storage.insert(quotation.id(), quotation.clone());
        Ok(())
    }

    async fn get(&self, id: &QuotationId) -> RepositoryResult<Option<Quotation>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_customer(
        &self,
        customer: &CustomerId,
    ) -> RepositoryResult<Vec<Quotation>> {
        let storage = self.storage.read().await;
        let mut quotations: Vec<Quotation> = storage
            .values()
            .filter(|q| q.customer_id() == *customer)
            .cloned()
            .collect();
        quotations.sort_by(|a, b| a.quote_code().cmp(b.quote_code()));
        Ok(quotations)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        Ok(storage.len() as u64)
    }
}
