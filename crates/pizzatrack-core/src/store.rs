//! # Store Ports
//!
//! The persistence contracts the sale engine is written against. The
//! SQLite implementation lives in `pizzatrack-db`; [`InMemoryStore`]
//! implements them for tests.
//!
//! ## Transaction Shape
//! ```text
//! SaleStore::begin() ──► T: SaleTransaction
//!                         ├── RecipeStore   recipes_by_ids
//!                         ├── CatalogStore  ingredients_by_ids, decrement_stock
//!                         ├── SaleLedger    append_sale
//!                         │
//!                         ├── commit(self)  ──► everything becomes visible
//!                         └── drop(self)    ──► everything is discarded
//! ```
//!
//! Reads made through a transaction see the state the later writes apply
//! to; a second transaction cannot slip a stock change in between.
//!
//! [`InMemoryStore`]: crate::memory::InMemoryStore

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::quantity::Quantity;
use crate::types::{Ingredient, IngredientId, NewSale, Recipe, RecipeId, SaleId, SalesReport};

/// Ingredient records and their stock.
#[async_trait]
pub trait CatalogStore: Send {
    /// Ingredients for the given ids; ids with no row are absent from the map.
    async fn ingredients_by_ids(
        &mut self,
        ids: &[IngredientId],
    ) -> StoreResult<HashMap<IngredientId, Ingredient>>;

    /// Subtracts every amount from its ingredient's stock.
    ///
    /// Fails with `NotFound` for an unknown id and with `StockConflict` if a
    /// row would go negative. On failure the caller must drop the
    /// transaction; partial decrements are never committed.
    async fn decrement_stock(&mut self, amounts: &BTreeMap<IngredientId, Quantity>)
        -> StoreResult<()>;
}

/// Recipe records with their ingredient lines.
#[async_trait]
pub trait RecipeStore: Send {
    /// Recipes for the given ids; ids with no row are absent from the map.
    async fn recipes_by_ids(&mut self, ids: &[RecipeId]) -> StoreResult<HashMap<RecipeId, Recipe>>;
}

/// Append-only record of completed sales.
#[async_trait]
pub trait SaleLedger: Send {
    /// Writes the header and all its lines, returning the new sale id.
    async fn append_sale(&mut self, sale: &NewSale) -> StoreResult<SaleId>;
}

/// One isolated unit of work over all three stores.
#[async_trait]
pub trait SaleTransaction: CatalogStore + RecipeStore + SaleLedger + Send {
    /// Makes every write of this transaction durable.
    async fn commit(self) -> StoreResult<()>;
}

/// Entry point: opens transactions and answers report queries.
#[async_trait]
pub trait SaleStore: Send + Sync {
    type Transaction: SaleTransaction;

    async fn begin(&self) -> StoreResult<Self::Transaction>;

    /// Sale lines since `since`, grouped by recipe.
    async fn sales_report(&self, since: DateTime<Utc>) -> StoreResult<SalesReport>;
}
