//! PostgreSQL-backed notification store.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;
use cds_entity::notification::{NotificationRow, NotificationSet};
use cds_entity::scope::Scope;

use crate::store::NotificationStore;

/// Repository over the `application_pipeline_notification` table.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn delete_where(&self, column: &str, id: i64) -> AppResult<u64> {
        let sql = format!("DELETE FROM application_pipeline_notification WHERE {column} = $1");
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete notifications by {column}"),
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn load(&self, scope: &Scope) -> AppResult<Option<NotificationSet>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM application_pipeline_notification \
             WHERE application_id = $1 AND pipeline_id = $2 AND environment_id = $3 \
             ORDER BY kind",
        )
        .bind(scope.application_id)
        .bind(scope.pipeline_id)
        .bind(scope.environment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to load notifications", e))?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut set = NotificationSet::new(*scope);
        for row in rows {
            let (kind, settings) = row.into_settings()?;
            set.notifications.insert(kind, settings);
        }
        Ok(Some(set))
    }

    async fn replace(&self, set: &NotificationSet) -> AppResult<()> {
        set.validate()?;
        let scope = set.scope;

        let rows = set
            .notifications
            .iter()
            .map(|(kind, settings)| NotificationRow::from_settings(scope, *kind, settings))
            .collect::<AppResult<Vec<_>>>()?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to open transaction", e)
        })?;

        // Writers to the same scope queue here until the holder commits.
        sqlx::query(
            "SELECT pg_advisory_xact_lock(hashtextextended( \
             format('%s/%s/%s', $1::bigint, $2::bigint, $3::bigint), 0))",
        )
        .bind(scope.application_id)
        .bind(scope.pipeline_id)
        .bind(scope.environment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to lock scope", e))?;

        sqlx::query(
            "DELETE FROM application_pipeline_notification \
             WHERE application_id = $1 AND pipeline_id = $2 AND environment_id = $3",
        )
        .bind(scope.application_id)
        .bind(scope.pipeline_id)
        .bind(scope.environment_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to clear previous notifications", e)
        })?;

        for row in &rows {
            sqlx::query(
                "INSERT INTO application_pipeline_notification \
                 (application_id, pipeline_id, environment_id, kind, on_start, on_success, \
                  on_failure, payload, template_subject, template_body, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(row.application_id)
            .bind(row.pipeline_id)
            .bind(row.environment_id)
            .bind(&row.kind)
            .bind(row.on_start)
            .bind(&row.on_success)
            .bind(&row.on_failure)
            .bind(&row.payload)
            .bind(&row.template_subject)
            .bind(&row.template_body)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to insert '{}' notification", row.kind),
                    e,
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit notifications", e)
        })?;

        debug!(%scope, kinds = rows.len(), "Replaced notification set");
        Ok(())
    }

    async fn delete_scope(&self, scope: &Scope) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM application_pipeline_notification \
             WHERE application_id = $1 AND pipeline_id = $2 AND environment_id = $3",
        )
        .bind(scope.application_id)
        .bind(scope.pipeline_id)
        .bind(scope.environment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to delete notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    async fn delete_for_application(&self, application_id: i64) -> AppResult<u64> {
        self.delete_where("application_id", application_id).await
    }

    async fn delete_for_pipeline(&self, pipeline_id: i64) -> AppResult<u64> {
        self.delete_where("pipeline_id", pipeline_id).await
    }

    async fn delete_for_environment(&self, environment_id: i64) -> AppResult<u64> {
        self.delete_where("environment_id", environment_id).await
    }
}
