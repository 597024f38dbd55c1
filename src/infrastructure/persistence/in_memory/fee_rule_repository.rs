//! # In-Memory Fee Rule Repository
//!
//! In-memory implementation of [`FeeRuleRepository`] for tests and the
//! default binary wiring.
//!
//! Uses a thread-safe `HashMap` for storage and enforces the rule-code
//! uniqueness invariant on save.

use crate::domain::entities::fee_rule::FeeRule;
use crate::domain::value_objects::{FeeRuleId, RuleCode, ServiceCategory};
use crate::infrastructure::persistence::traits::{
    FeeRuleRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`FeeRuleRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeeRuleRepository {
    storage: Arc<RwLock<HashMap<FeeRuleId, FeeRule>>>,
}

impl InMemoryFeeRuleRepository {
    /// Creates a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all rules.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

#[async_trait]
impl FeeRuleRepository for InMemoryFeeRuleRepository {
    async fn save(&self, rule: &FeeRule) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let duplicate = storage
            .values()
            .any(|existing| existing.code() == rule.code() && existing.id() != rule.id());
        if duplicate {
            return Err(RepositoryError::duplicate("FeeRule", rule.code().as_str()));
        }
        storage.insert(rule.id(), rule.clone());
        Ok(())
    }

    async fn get(&self, id: &FeeRuleId) -> RepositoryResult<Option<FeeRule>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_code(&self, code: &RuleCode) -> RepositoryResult<Option<FeeRule>> {
        let storage = self.storage.read().await;
        Ok(storage.values().find(|r| r.code() == code).cloned())
    }

    async fn find_active_by_category(
        &self,
        category: ServiceCategory,
    ) -> RepositoryResult<Vec<FeeRule>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|r| r.is_active() && r.service_category() == category)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<FeeRule>> {
        let storage = self.storage.read().await;
        Ok(storage.values().cloned().collect())
    }

    async fn max_display_order(&self, category: ServiceCategory) -> RepositoryResult<i32> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .filter(|r| r.service_category() == category)
            .map(FeeRule::display_order)
            .max()
            .unwrap_or(0))
    }

    async fn delete(&self, id: &FeeRuleId) -> RepositoryResult<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.remove(id).is_some())
    }
}
