//! # Sale Repository
//!
//! The append-only sales ledger and the sales report.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. COMMIT (inside the sale transaction)                               │
//! │     └── append() → INSERT sales, INSERT sale_lines × n                 │
//! │                                                                         │
//! │  2. REPORT (pool, read-only)                                           │
//! │     └── report(since) → totals + pizzas sold per recipe                │
//! │                                                                         │
//! │  Sales are never updated or deleted.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Recipe name, size and price are copied into each sale line. A report
//! still reads correctly after the recipe is renamed, repriced or deleted.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use pizzatrack_core::{
    Money, NewSale, PizzaSize, RecipeId, RecipeSalesSummary, SaleId, SaleLine, SalesReport,
};

#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    recipe_id: RecipeId,
    recipe_name: String,
    recipe_size: PizzaSize,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

impl From<SaleLineRow> for SaleLine {
    fn from(row: SaleLineRow) -> Self {
        SaleLine {
            recipe_id: row.recipe_id,
            recipe_name: row.recipe_name,
            size: row.recipe_size,
            quantity: row.quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
            line_total: Money::from_cents(row.line_total_cents),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    recipe_id: RecipeId,
    recipe_name: String,
    recipe_size: PizzaSize,
    pizzas_sold: i64,
    revenue_cents: i64,
}

/// Writes a sale header and its lines on `conn`, returning the new id.
pub(crate) async fn append(conn: &mut SqliteConnection, sale: &NewSale) -> DbResult<SaleId> {
    let result = sqlx::query("INSERT INTO sales (total_cents, created_at) VALUES (?1, ?2)")
        .bind(sale.total_amount.cents())
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

    let sale_id = SaleId(result.last_insert_rowid());

    for line in &sale.lines {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (
                sale_id, recipe_id, recipe_name, recipe_size,
                quantity, unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(sale_id)
        .bind(line.recipe_id)
        .bind(&line.recipe_name)
        .bind(line.size)
        .bind(line.quantity)
        .bind(line.unit_price.cents())
        .bind(line.line_total.cents())
        .execute(&mut *conn)
        .await?;
    }

    debug!(sale_id = %sale_id, lines = sale.lines.len(), total = %sale.total_amount, "Sale appended");
    Ok(sale_id)
}

/// Repository for the sales ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lines of one sale in the order they were written.
    pub async fn get_lines(&self, sale_id: SaleId) -> DbResult<Vec<SaleLine>> {
        let rows: Vec<SaleLineRow> = sqlx::query_as(
            r#"
            SELECT recipe_id, recipe_name, recipe_size, quantity,
                   unit_price_cents, line_total_cents
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleLine::from).collect())
    }

    /// Totals of every sale created at or after `since`.
    ///
    /// ## Report Shape
    /// ```text
    /// total_sales  = Σ sales.total_cents
    /// order_count  = number of sales
    /// by_recipe    = per (recipe, name, size): Σ quantity, Σ line_total
    ///                ordered by pizzas sold, most first
    /// ```
    pub async fn report(&self, since: DateTime<Utc>) -> DbResult<SalesReport> {
        let (total_cents, order_count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_cents), 0), COUNT(id) FROM sales WHERE created_at >= ?1",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT
                sl.recipe_id,
                sl.recipe_name,
                sl.recipe_size,
                SUM(sl.quantity) AS pizzas_sold,
                SUM(sl.line_total_cents) AS revenue_cents
            FROM sale_lines sl
            JOIN sales s ON s.id = sl.sale_id
            WHERE s.created_at >= ?1
            GROUP BY sl.recipe_id, sl.recipe_name, sl.recipe_size
            ORDER BY pizzas_sold DESC, sl.recipe_id ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesReport {
            since,
            total_sales: Money::from_cents(total_cents),
            order_count,
            by_recipe: rows
                .into_iter()
                .map(|row| RecipeSalesSummary {
                    recipe_id: row.recipe_id,
                    name: row.recipe_name,
                    size: row.recipe_size,
                    pizzas_sold: row.pizzas_sold,
                    revenue: Money::from_cents(row.revenue_cents),
                })
                .collect(),
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::Duration;

    fn line(recipe_id: i64, name: &str, size: PizzaSize, quantity: i64, price_cents: i64) -> SaleLine {
        SaleLine {
            recipe_id: RecipeId(recipe_id),
            recipe_name: name.to_string(),
            size,
            quantity,
            unit_price: Money::from_cents(price_cents),
            line_total: Money::from_cents(price_cents * quantity),
        }
    }

    fn sale(created_at: DateTime<Utc>, lines: Vec<SaleLine>) -> NewSale {
        NewSale {
            total_amount: lines.iter().map(|l| l.line_total).sum(),
            created_at,
            lines,
        }
    }

    async fn append_on_pool(db: &Database, new: &NewSale) -> SaleId {
        let mut conn = db.pool().acquire().await.unwrap();
        append(&mut conn, new).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_read_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let new = sale(
            Utc::now(),
            vec![
                line(1, "Hawaiana", PizzaSize::Grande, 2, 18900),
                line(2, "Margarita", PizzaSize::Mediana, 1, 12950),
            ],
        );

        let id = append_on_pool(&db, &new).await;
        let lines = db.sales().get_lines(id).await.unwrap();

        assert_eq!(lines, new.lines);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_report_groups_by_recipe_and_filters_by_time() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        append_on_pool(&db, &sale(now - Duration::days(2), vec![line(1, "Hawaiana", PizzaSize::Grande, 9, 18900)])).await;
        append_on_pool(&db, &sale(now, vec![line(1, "Hawaiana", PizzaSize::Grande, 1, 18900)])).await;
        append_on_pool(
            &db,
            &sale(
                now,
                vec![
                    line(2, "Margarita", PizzaSize::Mediana, 3, 12950),
                    line(1, "Hawaiana", PizzaSize::Grande, 1, 18900),
                ],
            ),
        )
        .await;

        let report = db.sales().report(now - Duration::hours(1)).await.unwrap();

        assert_eq!(report.order_count, 2);
        assert_eq!(report.total_sales, Money::from_cents(18900 + 3 * 12950 + 18900));
        assert_eq!(report.by_recipe.len(), 2);
        assert_eq!(report.by_recipe[0].name, "Margarita");
        assert_eq!(report.by_recipe[0].pizzas_sold, 3);
        assert_eq!(report.by_recipe[1].pizzas_sold, 2);
        assert_eq!(report.by_recipe[1].revenue, Money::from_cents(37800));
    }

    #[tokio::test]
    async fn test_empty_report() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = db.sales().report(Utc::now()).await.unwrap();
        assert_eq!(report.total_sales, Money::zero());
        assert_eq!(report.order_count, 0);
        assert!(report.by_recipe.is_empty());
    }
}
