//! Database migration runner.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;

use dealerchat_core::error::{AppError, ErrorKind};

/// One row of the sqlx migration ledger.
#[derive(Debug, Clone, FromRow)]
pub struct AppliedMigration {
    /// Migration version (timestamp prefix of the file name).
    pub version: i64,
    /// Migration description.
    pub description: String,
    /// Whether the migration completed.
    pub success: bool,
    /// When it was applied.
    pub installed_on: DateTime<Utc>,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}

/// List applied migrations, oldest first.
///
/// Empty if migrations have never run.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<AppliedMigration>, AppError> {
    let ledger_exists: bool =
        sqlx::query_scalar("SELECT to_regclass('public._sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect migrations", e)
            })?;
    if !ledger_exists {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, success, installed_on \
         FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read migrations", e))
}
