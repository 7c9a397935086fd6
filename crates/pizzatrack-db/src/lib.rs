//! # pizzatrack-db: Database Layer for Pizzatrack
//!
//! SQLite storage for the almacén, the recipe catalog and the sales ledger,
//! plus the transactional [`SqliteSaleStore`] the sale engine commits
//! through.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pizzatrack Data Flow                             │
//! │                                                                         │
//! │  POST /api/pizzas/ventas                    GET /api/almacen            │
//! │       │                                          │                      │
//! │       ▼                                          │                      │
//! │  SaleEngine (pizzatrack-core)                    │                      │
//! │       │ SaleStore::begin()                       │                      │
//! │       ▼                                          ▼                      │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  pizzatrack-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │ SqliteSale-   │   │  Repositories  │   │  Migrations  │   │   │
//! │  │   │ Store (tx)    │──►│ ingredient.rs  │   │  (embedded)  │   │   │
//! │  │   │               │   │ recipe.rs      │   │              │   │   │
//! │  │   │               │   │ sale.rs        │   │ 001_init.sql │   │   │
//! │  │   └───────┬───────┘   └───────┬────────┘   └──────────────┘   │   │
//! │  │           └──────── Database (pool.rs) ────┘                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL, foreign keys on)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Ingredient, recipe and sale repositories
//! - [`store`] - `SaleStore` implementation over a SQLite transaction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pizzatrack_core::SaleEngine;
//! use pizzatrack_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./pizzatrack.db")).await?;
//!
//! let ingredients = db.ingredients().list().await?;
//! let engine = SaleEngine::new(db.sale_store());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig, Location};
pub use store::{SqliteSaleStore, SqliteSaleTransaction};

// Repository re-exports for convenience
pub use repository::ingredient::IngredientRepository;
pub use repository::recipe::RecipeRepository;
pub use repository::sale::SaleRepository;
