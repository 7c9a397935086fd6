//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the crate and applied
//! in file-name order; sqlx records each applied script (with its checksum)
//! in `_sqlx_migrations`, so running again is a no-op.
//!
//! ```text
//! 001_initial_schema.sql   ingredients ◄── recipe_ingredients ──► recipes
//!                          sales ◄── sale_lines
//! ```
//!
//! New schema changes go in a new `NNN_description.sql`. An applied script
//! is never edited: its checksum would no longer match.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applied-versus-embedded counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn pending(&self) -> usize {
        self.embedded.saturating_sub(self.applied)
    }
}

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await.ok();
    MIGRATOR.run(pool).await?;

    match before {
        Some(status) if status.pending() == 0 => debug!("Schema up to date"),
        Some(status) => info!(applied = status.pending(), "Migrations applied"),
        None => info!(applied = MIGRATOR.migrations.len(), "Schema created"),
    }
    Ok(())
}

/// Fails on a database that has never been migrated.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
