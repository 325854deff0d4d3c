//! In-process notification store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cds_core::result::AppResult;
use cds_entity::notification::NotificationSet;
use cds_entity::scope::Scope;

use crate::store::NotificationStore;

/// Keeps whole sets per scope; a replace swaps the set under the write lock.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    sets: RwLock<HashMap<Scope, NotificationSet>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of configured scopes.
    pub async fn len(&self) -> usize {
        self.sets.read().await.len()
    }

    async fn delete_matching(&self, predicate: impl Fn(&Scope) -> bool) -> u64 {
        let mut sets = self.sets.write().await;
        let mut removed = 0u64;
        sets.retain(|scope, set| {
            if predicate(scope) {
                removed += set.len() as u64;
                false
            } else {
                true
            }
        });
        removed
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn load(&self, scope: &Scope) -> AppResult<Option<NotificationSet>> {
        Ok(self.sets.read().await.get(scope).cloned())
    }

    async fn replace(&self, set: &NotificationSet) -> AppResult<()> {
        set.validate()?;
        let mut sets = self.sets.write().await;
        if set.is_empty() {
            sets.remove(&set.scope);
        } else {
            sets.insert(set.scope, set.clone());
        }
        Ok(())
    }

    async fn delete_scope(&self, scope: &Scope) -> AppResult<u64> {
        Ok(self
            .sets
            .write()
            .await
            .remove(scope)
            .map(|set| set.len() as u64)
            .unwrap_or(0))
    }

    async fn delete_for_application(&self, application_id: i64) -> AppResult<u64> {
        Ok(self
            .delete_matching(|s| s.application_id == application_id)
            .await)
    }

    async fn delete_for_pipeline(&self, pipeline_id: i64) -> AppResult<u64> {
        Ok(self.delete_matching(|s| s.pipeline_id == pipeline_id).await)
    }

    async fn delete_for_environment(&self, environment_id: i64) -> AppResult<u64> {
        Ok(self
            .delete_matching(|s| s.environment_id == environment_id)
            .await)
    }
}
