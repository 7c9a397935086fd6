//! # Recipe Repository
//!
//! Recipes (one row per name × size) and their ingredient lines.
//!
//! ## Tables
//! ```text
//! recipes                     recipe_ingredients                ingredients
//! ┌────┬─────────┬────────┐   ┌───────────┬───────────────┐     ┌────┬────────┐
//! │ id │ name    │ size   │◄──│ recipe_id │ ingredient_id │────►│ id │ name   │
//! │  1 │ Hawaiana│ Grande │   │         1 │             3 │     │  3 │ Queso  │
//! └────┴─────────┴────────┘   │ quantity_milli, position  │     └────┴────────┘
//!                             └───────────────────────────┘
//! ```
//!
//! Lines are written and replaced together with their header inside one
//! transaction; a recipe is never visible with half its lines.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::push_id_list;
use pizzatrack_core::{
    IngredientId, Money, NewRecipe, PizzaSize, Quantity, Recipe, RecipeDetail, RecipeId,
    RecipeIngredient, RecipeLine,
};

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: RecipeId,
    name: String,
    size: PizzaSize,
    price_cents: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    recipe_id: RecipeId,
    ingredient_id: IngredientId,
    quantity_milli: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct DetailLineRow {
    recipe_id: RecipeId,
    ingredient_id: IngredientId,
    ingredient_name: String,
    unit_of_measure: String,
    quantity_milli: i64,
}

impl RecipeRow {
    fn into_recipe(self, lines: Vec<RecipeLine>) -> Recipe {
        Recipe {
            id: self.id,
            name: self.name,
            size: self.size,
            unit_price: Money::from_cents(self.price_cents),
            lines,
        }
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

/// Loads recipes with their lines. Unknown ids are absent from the map.
pub(crate) async fn fetch_by_ids(
    conn: &mut SqliteConnection,
    ids: &[RecipeId],
) -> DbResult<HashMap<RecipeId, Recipe>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT id, name, size, price_cents FROM recipes WHERE id IN ");
    push_id_list(&mut builder, ids.iter().map(|id| id.get()));
    let headers: Vec<RecipeRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT recipe_id, ingredient_id, quantity_milli FROM recipe_ingredients WHERE recipe_id IN ",
    );
    push_id_list(&mut builder, ids.iter().map(|id| id.get()));
    builder.push(" ORDER BY recipe_id, position");
    let line_rows: Vec<LineRow> = builder.build_query_as().fetch_all(&mut *conn).await?;

    let mut lines: HashMap<RecipeId, Vec<RecipeLine>> = HashMap::new();
    for row in line_rows {
        lines.entry(row.recipe_id).or_default().push(RecipeLine {
            ingredient_id: row.ingredient_id,
            quantity_per_unit: Quantity::from_milli(row.quantity_milli),
        });
    }

    Ok(headers
        .into_iter()
        .map(|header| {
            let recipe_lines = lines.remove(&header.id).unwrap_or_default();
            (header.id, header.into_recipe(recipe_lines))
        })
        .collect())
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    recipe_id: RecipeId,
    lines: &[RecipeLine],
) -> DbResult<()> {
    for (position, line) in lines.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity_milli, position)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(recipe_id)
        .bind(line.ingredient_id)
        .bind(line.quantity_per_unit.milli())
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for recipe database operations.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Creates a new RecipeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecipeRepository { pool }
    }

    /// Every recipe with its ingredients resolved to names and units.
    ///
    /// Ordered by name, then size descending (Mediana before Grande).
    pub async fn list_detailed(&self) -> DbResult<Vec<RecipeDetail>> {
        let headers: Vec<RecipeRow> = sqlx::query_as(
            "SELECT id, name, size, price_cents FROM recipes ORDER BY name ASC, size DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let line_rows: Vec<DetailLineRow> = sqlx::query_as(
            r#"
            SELECT
                ri.recipe_id,
                ri.ingredient_id,
                i.name AS ingredient_name,
                i.unit_of_measure,
                ri.quantity_milli
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            ORDER BY ri.recipe_id, ri.position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut ingredients: HashMap<RecipeId, Vec<RecipeIngredient>> = HashMap::new();
        for row in line_rows {
            ingredients.entry(row.recipe_id).or_default().push(RecipeIngredient {
                ingredient_id: row.ingredient_id,
                name: row.ingredient_name,
                quantity_per_unit: Quantity::from_milli(row.quantity_milli),
                unit_of_measure: row.unit_of_measure,
            });
        }

        Ok(headers
            .into_iter()
            .map(|header| RecipeDetail {
                ingredients: ingredients.remove(&header.id).unwrap_or_default(),
                id: header.id,
                name: header.name,
                size: header.size,
                unit_price: Money::from_cents(header.price_cents),
            })
            .collect())
    }

    /// Gets a recipe and its lines by ID.
    pub async fn get_by_id(&self, id: RecipeId) -> DbResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_by_ids(&mut conn, &[id]).await?.remove(&id))
    }

    /// Inserts a recipe and its lines atomically.
    ///
    /// ## Errors
    /// - [`DbError::UniqueViolation`] if the name × size already exists
    /// - [`DbError::ForeignKeyViolation`] if a line names an unknown ingredient
    pub async fn insert(&self, new: &NewRecipe) -> DbResult<Recipe> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (name, size, price_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&new.name)
        .bind(new.size)
        .bind(new.unit_price.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id = RecipeId(result.last_insert_rowid());
        insert_lines(&mut tx, id, &new.lines).await?;

        tx.commit().await?;
        debug!(id = %id, name = %new.name, size = %new.size, "Recipe inserted");

        Ok(Recipe {
            id,
            name: new.name.clone(),
            size: new.size,
            unit_price: new.unit_price,
            lines: new.lines.clone(),
        })
    }

    /// Replaces a recipe's header and all its lines atomically.
    pub async fn update(&self, id: RecipeId, new: &NewRecipe) -> DbResult<Recipe> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes SET name = ?1, size = ?2, price_cents = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&new.name)
        .bind(new.size)
        .bind(new.unit_price.cents())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("recipe", id));
        }

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, id, &new.lines).await?;

        tx.commit().await?;
        debug!(id = %id, "Recipe updated");

        Ok(Recipe {
            id,
            name: new.name.clone(),
            size: new.size,
            unit_price: new.unit_price,
            lines: new.lines.clone(),
        })
    }

    /// Deletes a recipe; its lines go with it. Past sale lines keep their
    /// snapshots.
    pub async fn delete(&self, id: RecipeId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("recipe", id));
        }

        debug!(id = %id, "Recipe deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
