//! # Pool & Handle
//!
//! Opening the SQLite file, tuning each connection, and the [`Database`]
//! handle every caller goes through.
//!
//! ```text
//! DbConfig ──► Database::new ──► SqlitePool ──┬── ingredients() / recipes() / sales()
//!  (file or        │                          │     short pool-level reads and CRUD
//!   memory)        └─ MIGRATOR (if migrate)   │
//!                                             └── sale_store().begin()
//!                                                   one pooled connection held
//!                                                   for the whole sale
//! ```
//!
//! Every connection runs with:
//!
//! | pragma         | value    |                                            |
//! |----------------|----------|--------------------------------------------|
//! | `journal_mode` | `WAL`    | reports and listings keep reading during a sale |
//! | `synchronous`  | `NORMAL` |                                            |
//! | `foreign_keys` | `ON`     | recipe lines must name real ingredients    |
//! | `busy_timeout` | 5 s      | a second sale waits for the write lock, then fails |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::ingredient::IngredientRepository;
use crate::repository::recipe::RecipeRepository;
use crate::repository::sale::SaleRepository;
use crate::store::SqliteSaleStore;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Private to the pool's single connection; gone when it closes.
    Memory,
}

/// Pool settings.
///
/// ```rust
/// use pizzatrack_db::DbConfig;
///
/// let config = DbConfig::new("./pizzatrack.db").max_connections(8);
/// assert_eq!(config.max_connections, 8);
/// assert_eq!(DbConfig::in_memory().max_connections, 1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub location: Location,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Wait for a free pooled connection.
    pub acquire_timeout: Duration,
    /// Wait for SQLite's write lock.
    pub busy_timeout: Duration,
    pub idle_timeout: Duration,
    /// Apply pending migrations when the pool opens.
    pub migrate: bool,
}

impl DbConfig {
    /// A database file, created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            location: Location::File(path.into()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            migrate: true,
        }
    }

    /// A throwaway migrated database for tests and demos.
    pub fn in_memory() -> Self {
        DbConfig {
            location: Location::Memory,
            // a second connection would open a second, empty database
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(3600),
            ..DbConfig::new(PathBuf::new())
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn migrate(mut self, migrate: bool) -> Self {
        self.migrate = migrate;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = match &self.location {
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?,
            Location::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout))
    }

    fn describe(&self) -> String {
        match &self.location {
            Location::File(path) => path.display().to_string(),
            Location::Memory => "<memory>".to_string(),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle over the pool. Clones share the same connections.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./pizzatrack.db")).await?;
/// let low_stock = db.ingredients().list().await?;
/// let receipt = SaleEngine::new(db.sale_store()).commit_sale(&cart).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, brings the schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let target = config.describe();
        info!(database = %target, "Opening database");

        let options = config.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(format!("{target}: {e}")))?;
        debug!(
            max = config.max_connections,
            min = config.min_connections,
            "Pool ready"
        );

        let db = Database { pool };
        if config.migrate {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Almacén CRUD.
    pub fn ingredients(&self) -> IngredientRepository {
        IngredientRepository::new(self.pool.clone())
    }

    pub fn recipes(&self) -> RecipeRepository {
        RecipeRepository::new(self.pool.clone())
    }

    /// Read side of the sale ledger.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// The transactional store the sale engine commits through.
    pub fn sale_store(&self) -> SqliteSaleStore {
        SqliteSaleStore::new(self.pool.clone())
    }

    /// Waits for checked-out connections to return, then closes them.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// `true` when a trivial query round-trips.
    pub async fn health_check(&self) -> bool {
        match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let status = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(status.pending(), 0);
    }

    #[tokio::test]
    async fn test_connection_pragmas() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(fk, 1);

        let busy: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(busy, 5_000);
    }

    #[tokio::test]
    async fn test_health_check_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
    }

    #[test]
    fn test_builder() {
        let config = DbConfig::new("/tmp/pizzatrack-test.db")
            .max_connections(10)
            .min_connections(2)
            .busy_timeout(Duration::from_secs(1))
            .migrate(false);

        assert_eq!(
            config.location,
            Location::File(PathBuf::from("/tmp/pizzatrack-test.db"))
        );
        assert_eq!((config.max_connections, config.min_connections), (10, 2));
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.migrate);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.location, Location::Memory);
        assert!(memory.migrate);
    }
}
