//! # pizzatrack-core: Pure Business Logic for Pizzatrack
//!
//! Domain types and the sale commit engine for the pizzeria back office.
//! Nothing in this crate touches a database or the network; persistence is
//! reached through the traits in [`store`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pizzatrack Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                React admin console (Venta de Pizzas)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ pizzatrack-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌─────────────┐ ┌──────────────┐   │   │
//! │  │   │  types  │ │  money   │ │ consumption │ │    engine    │   │   │
//! │  │   │ Recipe  │ │ quantity │ │    plan     │ │  SaleEngine  │   │   │
//! │  │   │  Cart   │ │ decimal  │ │             │ │              │   │   │
//! │  │   └─────────┘ └──────────┘ └─────────────┘ └──────┬───────┘   │   │
//! │  │                                                    │ store    │   │
//! │  │                                                    │ traits   │   │
//! │  └────────────────────────────────────────────────────┼──────────┘   │
//! │                                                       │              │
//! │  ┌────────────────────────────────────────────────────▼──────────┐   │
//! │  │            pizzatrack-db (SQLite transaction)                 │   │
//! │  └───────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Ingredients, recipes, carts, sales, reports
//! - [`money`] - Integer-cent money
//! - [`quantity`] - Fixed-point ingredient quantities (thousandths)
//! - [`decimal`] - Exact decimal text parsing shared by both
//! - [`error`] - Validation, store and sale errors
//! - [`validation`] - Business rule validation
//! - [`consumption`] - Aggregated ingredient requirements of a cart
//! - [`store`] - Catalog / recipe / ledger ports
//! - [`engine`] - The sale commit engine
//! - [`memory`] - In-memory store (tests, demos)
//!
//! ## Example Usage
//!
//! ```rust
//! use pizzatrack_core::{Money, Quantity};
//!
//! let price = Money::parse("129.50").unwrap();
//! assert_eq!(price.cents(), 12950);
//!
//! let cheese = Quantity::parse("0.250").unwrap(); // 250 g expressed in kg
//! assert_eq!(cheese.times(4), Quantity::from_units(1));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod consumption;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod memory;
pub mod money;
pub mod quantity;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use consumption::ConsumptionPlan;
pub use engine::SaleEngine;
pub use error::{SaleError, StoreError, ValidationError};
pub use memory::InMemoryStore;
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// A counter sale is a handful of pizzas; a hundred distinct recipes in one
/// ticket is a client bug, not an order.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single recipe in one cart line.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum ingredient lines in one recipe.
pub const MAX_RECIPE_LINES: usize = 50;
