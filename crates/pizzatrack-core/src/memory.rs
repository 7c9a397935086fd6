//! # In-Memory Store
//!
//! A [`SaleStore`] kept entirely in process memory, for engine tests and
//! demos.
//!
//! ```text
//! begin()  ──► lock the shared state (held until commit or drop)
//!              clone it into a working copy
//! reads / writes go to the working copy
//! commit() ──► write the working copy back, release the lock
//! drop     ──► discard the working copy, release the lock
//! ```
//!
//! Holding the lock for the whole transaction serializes commits, which is
//! the isolation a real database gives the same code.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::store::{CatalogStore, RecipeStore, SaleLedger, SaleStore, SaleTransaction};
use crate::types::{
    Ingredient, IngredientId, NewSale, Recipe, RecipeId, RecipeSalesSummary, SaleId, SalesReport,
};

/// A sale as the ledger holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSale {
    pub id: SaleId,
    pub sale: NewSale,
}

/// Everything the in-memory store holds. Comparable, so tests can assert
/// that a rejected sale left it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryState {
    pub ingredients: BTreeMap<IngredientId, Ingredient>,
    pub recipes: BTreeMap<RecipeId, Recipe>,
    pub sales: Vec<StoredSale>,
    next_sale_id: i64,
}

/// Shared handle; clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_decrement: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_ingredient(&self, ingredient: Ingredient) {
        self.state
            .lock()
            .await
            .ingredients
            .insert(ingredient.id, ingredient);
    }

    pub async fn insert_recipe(&self, recipe: Recipe) {
        self.state.lock().await.recipes.insert(recipe.id, recipe);
    }

    /// Copy of the current committed state.
    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn stock_of(&self, id: IngredientId) -> Option<Quantity> {
        self.state
            .lock()
            .await
            .ingredients
            .get(&id)
            .map(|ingredient| ingredient.stock)
    }

    /// Makes the next `decrement_stock` call fail with a backend error,
    /// after the sale has already been appended in that transaction.
    pub fn fail_next_decrement(&self) {
        self.fail_next_decrement.store(true, Ordering::SeqCst);
    }
}

/// Transaction over [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_next_decrement: Arc<AtomicBool>,
}

#[async_trait]
impl SaleStore for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> StoreResult<InMemoryTransaction> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        let working = committed.clone();
        Ok(InMemoryTransaction {
            committed,
            working,
            fail_next_decrement: Arc::clone(&self.fail_next_decrement),
        })
    }

    async fn sales_report(&self, since: DateTime<Utc>) -> StoreResult<SalesReport> {
        let state = self.state.lock().await;

        let mut total_sales = Money::zero();
        let mut order_count = 0;
        let mut by_recipe: HashMap<RecipeId, RecipeSalesSummary> = HashMap::new();

        for stored in state.sales.iter().filter(|s| s.sale.created_at >= since) {
            order_count += 1;
            total_sales += stored.sale.total_amount;

            for line in &stored.sale.lines {
                let summary = by_recipe
                    .entry(line.recipe_id)
                    .or_insert_with(|| RecipeSalesSummary {
                        recipe_id: line.recipe_id,
                        name: line.recipe_name.clone(),
                        size: line.size,
                        pizzas_sold: 0,
                        revenue: Money::zero(),
                    });
                summary.pizzas_sold += line.quantity;
                summary.revenue += line.line_total;
            }
        }

        let mut by_recipe: Vec<RecipeSalesSummary> = by_recipe.into_values().collect();
        by_recipe.sort_by(|a, b| {
            b.pizzas_sold
                .cmp(&a.pizzas_sold)
                .then(a.recipe_id.cmp(&b.recipe_id))
        });

        Ok(SalesReport {
            since,
            total_sales,
            order_count,
            by_recipe,
        })
    }
}

#[async_trait]
impl CatalogStore for InMemoryTransaction {
    async fn ingredients_by_ids(
        &mut self,
        ids: &[IngredientId],
    ) -> StoreResult<HashMap<IngredientId, Ingredient>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.ingredients.get(id))
            .map(|ingredient| (ingredient.id, ingredient.clone()))
            .collect())
    }

    async fn decrement_stock(
        &mut self,
        amounts: &BTreeMap<IngredientId, Quantity>,
    ) -> StoreResult<()> {
        if self.fail_next_decrement.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected decrement failure".to_string()));
        }

        for (id, amount) in amounts {
            let ingredient = self
                .working
                .ingredients
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound {
                    entity: "ingredient",
                    id: id.to_string(),
                })?;

            if ingredient.stock < *amount {
                return Err(StoreError::StockConflict(*id));
            }
            ingredient.stock = ingredient.stock - *amount;
        }

        Ok(())
    }
}

#[async_trait]
impl RecipeStore for InMemoryTransaction {
    async fn recipes_by_ids(&mut self, ids: &[RecipeId]) -> StoreResult<HashMap<RecipeId, Recipe>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.recipes.get(id))
            .map(|recipe| (recipe.id, recipe.clone()))
            .collect())
    }
}

#[async_trait]
impl SaleLedger for InMemoryTransaction {
    async fn append_sale(&mut self, sale: &NewSale) -> StoreResult<SaleId> {
        self.working.next_sale_id += 1;
        let id = SaleId(self.working.next_sale_id);
        self.working.sales.push(StoredSale {
            id,
            sale: sale.clone(),
        });
        Ok(id)
    }
}

#[async_trait]
impl SaleTransaction for InMemoryTransaction {
    async fn commit(self) -> StoreResult<()> {
        let InMemoryTransaction {
            mut committed,
            working,
            ..
        } = self;
        *committed = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PizzaSize, SaleLine};
    use chrono::Duration;

    fn cheese(units: i64) -> Ingredient {
        Ingredient {
            id: IngredientId(1),
            name: "Queso".to_string(),
            unit_of_measure: "kg".to_string(),
            stock: Quantity::from_units(units),
            unit_cost: Money::zero(),
        }
    }

    fn sale_at(created_at: DateTime<Utc>, recipe: i64, quantity: i64) -> NewSale {
        let unit_price = Money::from_units(100);
        NewSale {
            total_amount: unit_price * quantity,
            created_at,
            lines: vec![SaleLine {
                recipe_id: RecipeId(recipe),
                recipe_name: format!("Receta {}", recipe),
                size: PizzaSize::Grande,
                quantity,
                unit_price,
                line_total: unit_price * quantity,
            }],
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = InMemoryStore::new();
        store.insert_ingredient(cheese(10)).await;
        let before = store.snapshot().await;

        {
            let mut tx = store.begin().await.unwrap();
            let amounts = BTreeMap::from([(IngredientId(1), Quantity::from_units(4))]);
            tx.decrement_stock(&amounts).await.unwrap();
            tx.append_sale(&sale_at(Utc::now(), 1, 1)).await.unwrap();
        }

        assert_eq!(store.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = InMemoryStore::new();
        store.insert_ingredient(cheese(10)).await;

        let mut tx = store.begin().await.unwrap();
        let amounts = BTreeMap::from([(IngredientId(1), Quantity::from_units(4))]);
        tx.decrement_stock(&amounts).await.unwrap();
        let id = tx.append_sale(&sale_at(Utc::now(), 1, 1)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(id, SaleId(1));
        assert_eq!(store.stock_of(IngredientId(1)).await, Some(Quantity::from_units(6)));
        assert_eq!(store.snapshot().await.sales.len(), 1);
    }

    #[tokio::test]
    async fn test_decrement_unknown_ingredient_is_not_found() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let amounts = BTreeMap::from([(IngredientId(9), Quantity::from_units(1))]);

        let err = tx.decrement_stock(&amounts).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "ingredient", .. }));
    }

    #[tokio::test]
    async fn test_sales_report_groups_and_filters_by_time() {
        let store = InMemoryStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        tx.append_sale(&sale_at(now - Duration::days(1), 1, 9)).await.unwrap();
        tx.append_sale(&sale_at(now, 1, 2)).await.unwrap();
        tx.append_sale(&sale_at(now, 2, 3)).await.unwrap();
        tx.append_sale(&sale_at(now, 1, 2)).await.unwrap();
        tx.commit().await.unwrap();

        let report = store.sales_report(now - Duration::hours(1)).await.unwrap();
        assert_eq!(report.order_count, 3);
        assert_eq!(report.total_sales, Money::from_units(700));
        assert_eq!(report.by_recipe.len(), 2);
        assert_eq!(report.by_recipe[0].recipe_id, RecipeId(1));
        assert_eq!(report.by_recipe[0].pizzas_sold, 4);
        assert_eq!(report.by_recipe[1].pizzas_sold, 3);
    }
}
