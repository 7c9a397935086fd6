//! # Database Errors
//!
//! [`DbError`] sorts a `sqlx::Error` into the cases callers react to
//! differently; anything else stays wrapped for the log.
//!
//! ```text
//! sqlx::Error
//!   RowNotFound ─────────────────────────► NotFound
//!   Database(e) by e.kind()
//!     UniqueViolation ───────────────────► UniqueViolation { field }
//!     ForeignKeyViolation ───────────────► ForeignKeyViolation
//!     Other, "FOREIGN KEY constraint ..." ─► ForeignKeyViolation (RESTRICT)
//!     CheckViolation / NotNullViolation ─► CheckViolation
//!     Other ─────────────────────────────► Sqlx(..)
//!   PoolTimedOut ────────────────────────► PoolExhausted
//!   anything else ───────────────────────► Sqlx(..)
//!
//! DbError ──► StoreError   (inside a sale: NotFound kept, the rest is Backend)
//!         ──► ApiError     (apps/api picks the status)
//! ```

use pizzatrack_core::StoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the id (update, delete or a `fetch_one`).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// `field` is SQLite's column list, e.g. `recipes.name, recipes.size`.
    #[error("Duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// A referenced row is missing, or a row still referenced was deleted.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Negative stock, non-positive quantity, a NULL where none is allowed.
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    /// Every pooled connection stayed busy past the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::RowNotFound => return DbError::not_found("record", "?"),
            sqlx::Error::PoolTimedOut => return DbError::PoolExhausted,
            sqlx::Error::Database(db_err) => db_err.kind(),
            _ => return DbError::Sqlx(err),
        };

        let message = match &err {
            sqlx::Error::Database(db_err) => db_err.message().to_string(),
            _ => String::new(),
        };

        match kind {
            ErrorKind::UniqueViolation => DbError::UniqueViolation {
                field: message
                    .strip_prefix("UNIQUE constraint failed: ")
                    .unwrap_or(&message)
                    .to_string(),
            },
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                DbError::CheckViolation { message }
            }
            // ON DELETE RESTRICT reports SQLITE_CONSTRAINT_TRIGGER, not _FOREIGNKEY
            _ if message.starts_with("FOREIGN KEY constraint failed") => {
                DbError::ForeignKeyViolation { message }
            }
            _ => DbError::Sqlx(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
