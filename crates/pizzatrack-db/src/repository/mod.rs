//! # Repository Module
//!
//! Database repository implementations for Pizzatrack.
//!
//! ## Two Ways In
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Catalog screens (pool)              Sale commit (one transaction)     │
//! │       │                                   │                             │
//! │  db.ingredients().list()             SqliteSaleTransaction             │
//! │  db.recipes().insert(&new)                │                             │
//! │  db.sales().report(since)                 │                             │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  ┌──────────────────────────────────────────────────────────────┐      │
//! │  │   shared query helpers taking `&mut SqliteConnection`        │      │
//! │  │   ingredient::fetch_by_ids   recipe::fetch_by_ids            │      │
//! │  │   ingredient::decrement      sale::append                    │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The helpers run the same SQL whether they are handed a pooled connection
//! or the connection inside an open transaction.
//!
//! ## Available Repositories
//!
//! - [`IngredientRepository`](ingredient::IngredientRepository) - Almacén CRUD
//! - [`RecipeRepository`](recipe::RecipeRepository) - Recipes and their lines
//! - [`SaleRepository`](sale::SaleRepository) - Ledger reads and reports

use sqlx::{QueryBuilder, Sqlite};

pub mod ingredient;
pub mod recipe;
pub mod sale;

/// Appends `(?, ?, ...)` with one bind per id and the closing parenthesis.
pub(crate) fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: impl IntoIterator<Item = i64>) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
}
