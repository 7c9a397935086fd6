//! # Ingredient Repository
//!
//! Database operations for the almacén (ingredient inventory).
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Guarded Decrement (one row)                           │
//! │                                                                         │
//! │  UPDATE ingredients                                                    │
//! │     SET stock_milli = stock_milli - :amount                            │
//! │   WHERE id = :id AND stock_milli >= :amount                            │
//! │       │                                                                 │
//! │       ├── 1 row  ──► done                                              │
//! │       └── 0 rows ──► row missing?  ──► NotFound                        │
//! │                      row present   ──► StockConflict                   │
//! │                                                                         │
//! │  The WHERE clause keeps the row non-negative even if a caller skipped  │
//! │  the sufficiency check.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::push_id_list;
use pizzatrack_core::{Ingredient, IngredientId, Money, NewIngredient, Quantity, StoreError};

const SELECT_INGREDIENT: &str =
    "SELECT id, name, unit_of_measure, stock_milli, unit_cost_cents FROM ingredients";

/// Row shape of the `ingredients` table.
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: IngredientId,
    name: String,
    unit_of_measure: String,
    stock_milli: i64,
    unit_cost_cents: i64,
}

impl From<IngredientRow> for Ingredient {
    fn from(row: IngredientRow) -> Self {
        Ingredient {
            id: row.id,
            name: row.name,
            unit_of_measure: row.unit_of_measure,
            stock: Quantity::from_milli(row.stock_milli),
            unit_cost: Money::from_cents(row.unit_cost_cents),
        }
    }
}

// =============================================================================
// Connection-level helpers (shared with the sale transaction)
// =============================================================================

/// Loads the ingredients with the given ids. Unknown ids are simply absent.
pub(crate) async fn fetch_by_ids(
    conn: &mut SqliteConnection,
    ids: &[IngredientId],
) -> DbResult<HashMap<IngredientId, Ingredient>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_INGREDIENT);
    builder.push(" WHERE id IN ");
    push_id_list(&mut builder, ids.iter().map(|id| id.get()));

    let rows: Vec<IngredientRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Ingredient::from(row)))
        .collect())
}

async fn exists(conn: &mut SqliteConnection, id: IngredientId) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM ingredients WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Subtracts every amount from its row, in ascending id order.
///
/// Returns the first failure as a [`StoreError`]; rows already decremented
/// stay decremented until the caller's transaction is dropped.
pub(crate) async fn decrement(
    conn: &mut SqliteConnection,
    amounts: &BTreeMap<IngredientId, Quantity>,
) -> Result<(), StoreError> {
    let now = Utc::now();

    for (&id, amount) in amounts {
        let result = sqlx::query(
            r#"
            UPDATE ingredients
            SET stock_milli = stock_milli - ?1,
                updated_at = ?2
            WHERE id = ?3 AND stock_milli >= ?1
            "#,
        )
        .bind(amount.milli())
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            if exists(conn, id).await? {
                return Err(StoreError::StockConflict(id));
            }
            return Err(DbError::not_found("ingredient", id).into());
        }

        debug!(ingredient_id = %id, amount = %amount, "Stock decremented");
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ingredient database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.ingredients();
///
/// let all = repo.list().await?;             // ordered by name
/// let cheese = repo.get_by_id(IngredientId(3)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    /// Creates a new IngredientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// All ingredients, alphabetical by name.
    pub async fn list(&self) -> DbResult<Vec<Ingredient>> {
        let rows: Vec<IngredientRow> =
            sqlx::query_as(&format!("{SELECT_INGREDIENT} ORDER BY name ASC, id ASC"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(Ingredient::from).collect())
    }

    /// Gets an ingredient by ID.
    pub async fn get_by_id(&self, id: IngredientId) -> DbResult<Option<Ingredient>> {
        let row: Option<IngredientRow> =
            sqlx::query_as(&format!("{SELECT_INGREDIENT} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Ingredient::from))
    }

    /// Gets several ingredients at once.
    pub async fn get_many(&self, ids: &[IngredientId]) -> DbResult<HashMap<IngredientId, Ingredient>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_ids(&mut conn, ids).await
    }

    /// Inserts a new ingredient and returns it with its assigned id.
    ///
    /// The input is expected to have passed
    /// [`validate_new_ingredient`](pizzatrack_core::validation::validate_new_ingredient).
    pub async fn insert(&self, new: &NewIngredient) -> DbResult<Ingredient> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (
                name, unit_of_measure, stock_milli, unit_cost_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&new.name)
        .bind(&new.unit_of_measure)
        .bind(new.stock.milli())
        .bind(new.unit_cost.cents())
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = IngredientId(result.last_insert_rowid());
        debug!(id = %id, name = %new.name, "Ingredient inserted");

        Ok(Ingredient {
            id,
            name: new.name.clone(),
            unit_of_measure: new.unit_of_measure.clone(),
            stock: new.stock,
            unit_cost: new.unit_cost,
        })
    }

    /// Replaces every field of an existing ingredient.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] when no row has this id.
    pub async fn update(&self, id: IngredientId, new: &NewIngredient) -> DbResult<Ingredient> {
        let result = sqlx::query(
            r#"
            UPDATE ingredients SET
                name = ?1,
                unit_of_measure = ?2,
                stock_milli = ?3,
                unit_cost_cents = ?4,
                updated_at = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&new.name)
        .bind(&new.unit_of_measure)
        .bind(new.stock.milli())
        .bind(new.unit_cost.cents())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ingredient", id));
        }

        debug!(id = %id, "Ingredient updated");

        Ok(Ingredient {
            id,
            name: new.name.clone(),
            unit_of_measure: new.unit_of_measure.clone(),
            stock: new.stock,
            unit_cost: new.unit_cost,
        })
    }

    /// Deletes an ingredient.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] when no row has this id
    /// - [`DbError::ForeignKeyViolation`] while a recipe still uses it
    pub async fn delete(&self, id: IngredientId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ingredient", id));
        }

        debug!(id = %id, "Ingredient deleted");
        Ok(())
    }

    /// Counts total ingredients.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
