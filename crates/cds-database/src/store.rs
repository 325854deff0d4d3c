//! Notification store contract.

use async_trait::async_trait;

use cds_core::result::AppResult;
use cds_entity::notification::NotificationSet;
use cds_entity::scope::Scope;

/// Persists and retrieves per-scope notification settings.
///
/// Implementations must make [`replace`](Self::replace) atomic: a
/// concurrent [`load`](Self::load) sees either the old set or the new one,
/// never a mix.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the set for a scope. `None` when nothing is configured.
    async fn load(&self, scope: &Scope) -> AppResult<Option<NotificationSet>>;

    /// Replace everything stored for `set.scope` with `set`.
    ///
    /// An empty set clears the scope.
    async fn replace(&self, set: &NotificationSet) -> AppResult<()>;

    /// Remove the set for one scope. Returns the number of kinds removed.
    async fn delete_scope(&self, scope: &Scope) -> AppResult<u64>;

    /// Remove every set owned by an application.
    async fn delete_for_application(&self, application_id: i64) -> AppResult<u64>;

    /// Remove every set attached to a pipeline.
    async fn delete_for_pipeline(&self, pipeline_id: i64) -> AppResult<u64>;

    /// Remove every set targeting an environment.
    async fn delete_for_environment(&self, environment_id: i64) -> AppResult<u64>;
}
