//! # SQLite Sale Store
//!
//! [`SaleStore`] over a single SQLite transaction per sale.
//!
//! ## Isolation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin()                                                               │
//! │    BEGIN                                                               │
//! │    no-op UPDATE on ingredients  ──► write lock taken now               │
//! │                                     (a second sale waits here, up to   │
//! │                                      busy_timeout)                     │
//! │  recipes_by_ids / ingredients_by_ids   read under the lock             │
//! │  append_sale                            INSERT sales, sale_lines       │
//! │  decrement_stock                        guarded UPDATE per ingredient  │
//! │  commit()  ──► COMMIT, lock released                                   │
//! │  drop      ──► ROLLBACK                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Because the lock is held from the first statement, the stock a sale
//! checks is the stock it decrements.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbError;
use crate::repository::{ingredient, recipe, sale};
use pizzatrack_core::error::StoreResult;
use pizzatrack_core::store::{CatalogStore, RecipeStore, SaleLedger, SaleStore, SaleTransaction};
use pizzatrack_core::{
    Ingredient, IngredientId, NewSale, Quantity, Recipe, RecipeId, SaleId, SalesReport,
};

/// Opens one SQLite transaction per sale.
#[derive(Debug, Clone)]
pub struct SqliteSaleStore {
    pool: SqlitePool,
}

impl SqliteSaleStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleStore { pool }
    }
}

/// An open sale transaction. Dropping it without [`commit`] rolls back.
///
/// [`commit`]: SaleTransaction::commit
#[derive(Debug)]
pub struct SqliteSaleTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl SaleStore for SqliteSaleStore {
    type Transaction = SqliteSaleTransaction;

    async fn begin(&self) -> StoreResult<SqliteSaleTransaction> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // takes the write lock up front
        sqlx::query("UPDATE ingredients SET stock_milli = stock_milli WHERE 0")
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        debug!("Sale transaction opened");
        Ok(SqliteSaleTransaction { tx })
    }

    async fn sales_report(&self, since: DateTime<Utc>) -> StoreResult<SalesReport> {
        Ok(sale::SaleRepository::new(self.pool.clone()).report(since).await?)
    }
}

#[async_trait]
impl CatalogStore for SqliteSaleTransaction {
    async fn ingredients_by_ids(
        &mut self,
        ids: &[IngredientId],
    ) -> StoreResult<HashMap<IngredientId, Ingredient>> {
        Ok(ingredient::fetch_by_ids(&mut self.tx, ids).await?)
    }

    async fn decrement_stock(
        &mut self,
        amounts: &BTreeMap<IngredientId, Quantity>,
    ) -> StoreResult<()> {
        ingredient::decrement(&mut self.tx, amounts).await
    }
}

#[async_trait]
impl RecipeStore for SqliteSaleTransaction {
    async fn recipes_by_ids(&mut self, ids: &[RecipeId]) -> StoreResult<HashMap<RecipeId, Recipe>> {
        Ok(recipe::fetch_by_ids(&mut self.tx, ids).await?)
    }
}

#[async_trait]
impl SaleLedger for SqliteSaleTransaction {
    async fn append_sale(&mut self, new: &NewSale) -> StoreResult<SaleId> {
        Ok(sale::append(&mut self.tx, new).await?)
    }
}

#[async_trait]
impl SaleTransaction for SqliteSaleTransaction {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(DbError::from)?;
        debug!("Sale transaction committed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use pizzatrack_core::{
        Cart, CartLine, Money, NewIngredient, NewRecipe, PizzaSize, RecipeLine, SaleEngine,
        SaleError, StoreError,
    };

    struct Pizzeria {
        db: Database,
        cheese: IngredientId,
        sauce: IngredientId,
        hawaiana: RecipeId,
        margarita: RecipeId,
    }

    async fn add_ingredient(db: &Database, name: &str, stock: &str) -> IngredientId {
        db.ingredients()
            .insert(&NewIngredient {
                name: name.to_string(),
                unit_of_measure: "kg".to_string(),
                stock: Quantity::parse(stock).unwrap(),
                unit_cost: Money::from_cents(9000),
            })
            .await
            .unwrap()
            .id
    }

    async fn add_recipe(db: &Database, name: &str, lines: &[(IngredientId, &str)]) -> RecipeId {
        db.recipes()
            .insert(&NewRecipe {
                name: name.to_string(),
                size: PizzaSize::Grande,
                unit_price: Money::from_cents(18900),
                lines: lines
                    .iter()
                    .map(|(ingredient_id, qty)| RecipeLine {
                        ingredient_id: *ingredient_id,
                        quantity_per_unit: Quantity::parse(qty).unwrap(),
                    })
                    .collect(),
            })
            .await
            .unwrap()
            .id
    }

    /// Cheese 10 kg, sauce 10 l. Hawaiana uses 3 kg cheese, Margarita 5 kg
    /// cheese and 0.125 l sauce.
    async fn pizzeria(config: DbConfig) -> Pizzeria {
        let db = Database::new(config).await.unwrap();
        let cheese = add_ingredient(&db, "Queso", "10").await;
        let sauce = add_ingredient(&db, "Salsa", "10").await;
        let hawaiana = add_recipe(&db, "Hawaiana", &[(cheese, "3")]).await;
        let margarita = add_recipe(&db, "Margarita", &[(cheese, "5"), (sauce, "0.125")]).await;
        Pizzeria {
            db,
            cheese,
            sauce,
            hawaiana,
            margarita,
        }
    }

    fn line(recipe_id: RecipeId, quantity: i64) -> CartLine {
        CartLine {
            recipe_id,
            quantity,
            unit_price: Money::from_cents(18900),
        }
    }

    async fn stock(db: &Database, id: IngredientId) -> Quantity {
        db.ingredients().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_engine_commits_through_sqlite() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let engine = SaleEngine::new(p.db.sale_store());

        let receipt = engine
            .commit_sale(&Cart::new(vec![line(p.hawaiana, 2)]))
            .await
            .unwrap();

        assert_eq!(receipt.total_amount, Money::from_cents(37800));
        assert_eq!(receipt.lines[0].recipe_name, "Hawaiana");
        assert_eq!(stock(&p.db, p.cheese).await, Quantity::from_units(4));
        assert_eq!(p.db.sales().get_lines(receipt.sale_id).await.unwrap(), receipt.lines);
    }

    #[tokio::test]
    async fn test_insufficient_shared_ingredient_leaves_database_untouched() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let engine = SaleEngine::new(p.db.sale_store());

        // 3 + 2 × 5 = 13 kg of cheese against 10
        let err = engine
            .commit_sale(&Cart::new(vec![line(p.hawaiana, 1), line(p.margarita, 2)]))
            .await
            .unwrap_err();

        match err {
            SaleError::InsufficientStock {
                ingredient_id,
                required,
                available,
                ..
            } => {
                assert_eq!(ingredient_id, p.cheese);
                assert_eq!(required, Quantity::from_units(13));
                assert_eq!(available, Quantity::from_units(10));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stock(&p.db, p.cheese).await, Quantity::from_units(10));
        assert_eq!(stock(&p.db, p.sauce).await, Quantity::from_units(10));
        assert_eq!(p.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_reported() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let engine = SaleEngine::new(p.db.sale_store());

        let err = engine
            .commit_sale(&Cart::new(vec![line(p.hawaiana, 1), line(RecipeId(404), 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, SaleError::RecipeNotFound(RecipeId(404))));
        assert_eq!(stock(&p.db, p.cheese).await, Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let store = p.db.sale_store();

        {
            let mut tx = store.begin().await.unwrap();
            let mut amounts = BTreeMap::new();
            amounts.insert(p.cheese, Quantity::from_units(4));
            tx.decrement_stock(&amounts).await.unwrap();
            tx.append_sale(&NewSale {
                total_amount: Money::from_cents(100),
                created_at: Utc::now(),
                lines: vec![],
            })
            .await
            .unwrap();

            // cheese goes through again, sauce cannot; the transaction is dropped
            amounts.insert(p.sauce, Quantity::from_units(50));
            assert_eq!(
                tx.decrement_stock(&amounts).await.unwrap_err(),
                StoreError::StockConflict(p.sauce)
            );
        }

        assert_eq!(stock(&p.db, p.cheese).await, Quantity::from_units(10));
        assert_eq!(p.db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fractional_consumption_is_exact() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let engine = SaleEngine::new(p.db.sale_store());
        let sauce_only = add_recipe(&p.db, "Marinara", &[(p.sauce, "0.125")]).await;

        engine
            .commit_sale(&Cart::new(vec![line(sauce_only, 8)]))
            .await
            .unwrap();

        assert_eq!(stock(&p.db, p.sauce).await, Quantity::from_units(9));
    }

    #[tokio::test]
    async fn test_report_through_store() {
        let p = pizzeria(DbConfig::in_memory()).await;
        let engine = SaleEngine::new(p.db.sale_store());
        let since = Utc::now() - chrono::Duration::minutes(1);

        engine.commit_sale(&Cart::new(vec![line(p.hawaiana, 1)])).await.unwrap();
        engine.commit_sale(&Cart::new(vec![line(p.hawaiana, 2)])).await.unwrap();

        let report = engine.store().sales_report(since).await.unwrap();
        assert_eq!(report.order_count, 2);
        assert_eq!(report.by_recipe[0].pizzas_sold, 3);
        assert_eq!(report.total_sales, Money::from_cents(3 * 18900));
    }

    #[tokio::test]
    async fn test_concurrent_sales_on_file_database_never_oversell() {
        let path = std::env::temp_dir().join(format!(
            "pizzatrack-concurrency-{}-{}.db",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let p = pizzeria(DbConfig::new(&path).max_connections(4)).await;
        let engine = SaleEngine::new(p.db.sale_store());

        // 10 kg of cheese, each cart needs 6
        let cart = Cart::new(vec![line(p.hawaiana, 2)]);
        let (a, b) = tokio::join!(engine.commit_sale(&cart), engine.commit_sale(&cart));

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(stock(&p.db, p.cheese).await, Quantity::from_units(4));
        assert_eq!(p.db.sales().count().await.unwrap(), 1);

        p.db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
