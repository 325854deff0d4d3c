//! Schema migrations for the notification table.

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::{Migrate, Migrator};
use tracing::info;

use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// One embedded migration and whether the database has it.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

fn migrate_error(context: &str, e: sqlx::migrate::MigrateError) -> AppError {
    AppError::with_source(ErrorKind::Storage, format!("{context}: {e}"), e)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!(count = MIGRATOR.iter().count(), "Applying notification schema migrations");

    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| migrate_error("Schema migration failed", e))?;

    info!("Notification schema is up to date");
    Ok(())
}

/// List embedded migrations against the ones recorded in the database.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationStatus>> {
    let mut conn = pool.acquire().await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to acquire connection", e)
    })?;

    conn.ensure_migrations_table()
        .await
        .map_err(|e| migrate_error("Failed to prepare migrations table", e))?;
    let applied = conn
        .list_applied_migrations()
        .await
        .map_err(|e| migrate_error("Failed to list applied migrations", e))?;

    Ok(MIGRATOR
        .iter()
        .filter(|m| m.migration_type.is_up_migration())
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.iter().any(|a| a.version == m.version),
        })
        .collect())
}
