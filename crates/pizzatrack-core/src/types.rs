//! # Domain Types
//!
//! Core domain types used throughout Pizzatrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Ingredient    │◄──│   RecipeLine    │◄──│     Recipe      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  ingredient_id  │   │  id             │       │
//! │  │  name, unit     │   │  qty per pizza  │   │  name, size     │       │
//! │  │  stock          │   └─────────────────┘   │  unit_price     │       │
//! │  └─────────────────┘                         └────────▲────────┘       │
//! │                                                       │ recipe_id      │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────┴────────┐       │
//! │  │  SaleReceipt    │◄──│    NewSale      │◄──│      Cart       │       │
//! │  │  sale_id, total │   │  total, lines   │   │  CartLine × n   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has a database-assigned integer id wrapped in its own newtype
//! (`RecipeId`, `IngredientId`, `SaleId`) so the two can never be swapped in
//! a call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[ts(export)]
        pub struct $name(pub i64);

        impl $name {
            #[inline]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of an ingredient in the almacén.
    IngredientId
);

entity_id!(
    /// Identifier of a pizza recipe (one per name × size).
    RecipeId
);

entity_id!(
    /// Identifier assigned by the ledger to a committed sale.
    SaleId
);

// =============================================================================
// Pizza Size
// =============================================================================

/// Size variant of a recipe. The same pizza name exists once per size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum PizzaSize {
    Mediana,
    Grande,
}

impl PizzaSize {
    pub const ALL: [PizzaSize; 2] = [PizzaSize::Mediana, PizzaSize::Grande];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PizzaSize::Mediana => "Mediana",
            PizzaSize::Grande => "Grande",
        }
    }
}

impl fmt::Display for PizzaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: the console sends "Mediana", older clients "mediana".
impl FromStr for PizzaSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PizzaSize::ALL
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// Ingredient
// =============================================================================

/// A raw material held in the almacén.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Ingredient {
    pub id: IngredientId,

    /// Display name ("Queso mozzarella").
    pub name: String,

    /// Unit the stock and every recipe amount is expressed in ("kg", "lt").
    pub unit_of_measure: String,

    /// Amount on hand. Never negative after a committed sale.
    pub stock: Quantity,

    /// Purchase cost per unit of measure.
    pub unit_cost: Money,
}

impl Ingredient {
    #[inline]
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::for_stock(self.stock)
    }
}

/// Input for creating or updating an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewIngredient {
    pub name: String,
    pub unit_of_measure: String,
    pub stock: Quantity,
    pub unit_cost: Money,
}

// =============================================================================
// Stock Status
// =============================================================================

/// Traffic light shown next to each ingredient in the inventory listing.
///
/// ```text
///   stock ≤ 5 units   ──► rojo      (reorder now)
///   stock ≤ 15 units  ──► amarillo  (running low)
///   otherwise         ──► verde
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Rojo,
    Amarillo,
    Verde,
}

impl StockStatus {
    pub const RED_LIMIT: Quantity = Quantity::from_units(5);
    pub const YELLOW_LIMIT: Quantity = Quantity::from_units(15);

    pub fn for_stock(stock: Quantity) -> Self {
        if stock <= Self::RED_LIMIT {
            StockStatus::Rojo
        } else if stock <= Self::YELLOW_LIMIT {
            StockStatus::Amarillo
        } else {
            StockStatus::Verde
        }
    }
}

// =============================================================================
// Recipe
// =============================================================================

/// One ingredient requirement of a recipe, per pizza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    /// Always positive.
    pub quantity_per_unit: Quantity,
}

/// A sellable pizza: name × size, menu price and ingredient lines.
///
/// A recipe resolved by the engine is treated as immutable for the rest of
/// that commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub size: PizzaSize,
    /// Menu price. The price actually charged travels on the cart line.
    pub unit_price: Money,
    /// Ordered as entered; an ingredient appears at most once.
    pub lines: Vec<RecipeLine>,
}

/// Input for creating or replacing a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRecipe {
    pub name: String,
    pub size: PizzaSize,
    pub unit_price: Money,
    pub lines: Vec<RecipeLine>,
}

/// A recipe line expanded with its ingredient's name and unit, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeIngredient {
    pub ingredient_id: IngredientId,
    pub name: String,
    pub quantity_per_unit: Quantity,
    pub unit_of_measure: String,
}

/// A recipe with its ingredient lines expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub name: String,
    pub size: PizzaSize,
    pub unit_price: Money,
    pub ingredients: Vec<RecipeIngredient>,
}

// =============================================================================
// Cart
// =============================================================================

/// One requested recipe at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub recipe_id: RecipeId,
    /// Number of pizzas, positive.
    pub quantity: i64,
    /// Price charged per pizza, independent of the catalog price.
    pub unit_price: Money,
}

impl CartLine {
    /// `unit_price × quantity`, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_times(self.quantity)
    }
}

/// An ordered list of cart lines. Built at the transport boundary and
/// checked with [`validate_cart`](crate::validation::validate_cart) before
/// the engine looks at it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Recipe ids in cart order.
    pub fn recipe_ids(&self) -> Vec<RecipeId> {
        self.lines.iter().map(|line| line.recipe_id).collect()
    }

    /// `Σ unit_price × quantity`, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            let line_total = line.line_total()?;
            acc.cents().checked_add(line_total.cents()).map(Money::from_cents)
        })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line of a committed sale. Recipe name and size are frozen at the time
/// of sale so the daily report survives later renames and deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    pub recipe_id: RecipeId,
    pub recipe_name: String,
    pub size: PizzaSize,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// What the engine hands the ledger to append: header and lines together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
}

/// Result of a committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub sale_id: SaleId,
    pub total_amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
}

// =============================================================================
// Sales Report
// =============================================================================

/// Pizzas sold per recipe in the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeSalesSummary {
    pub recipe_id: RecipeId,
    pub name: String,
    pub size: PizzaSize,
    pub pizzas_sold: i64,
    pub revenue: Money,
}

/// Sales since a point in time (the daily report uses local midnight).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    #[ts(as = "String")]
    pub since: DateTime<Utc>,
    pub total_sales: Money,
    pub order_count: i64,
    /// Ordered by pizzas sold, best seller first.
    pub by_recipe: Vec<RecipeSalesSummary>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pizza_size_parse() {
        assert_eq!("Mediana".parse::<PizzaSize>(), Ok(PizzaSize::Mediana));
        assert_eq!("grande".parse::<PizzaSize>(), Ok(PizzaSize::Grande));
        assert_eq!(" GRANDE ".parse::<PizzaSize>(), Ok(PizzaSize::Grande));
        assert!("Familiar".parse::<PizzaSize>().is_err());
        assert_eq!(PizzaSize::Mediana.to_string(), "Mediana");
    }

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(StockStatus::for_stock(Quantity::zero()), StockStatus::Rojo);
        assert_eq!(StockStatus::for_stock(Quantity::from_units(5)), StockStatus::Rojo);
        assert_eq!(
            StockStatus::for_stock(Quantity::from_milli(5001)),
            StockStatus::Amarillo
        );
        assert_eq!(
            StockStatus::for_stock(Quantity::from_units(15)),
            StockStatus::Amarillo
        );
        assert_eq!(StockStatus::for_stock(Quantity::from_units(16)), StockStatus::Verde);
    }

    #[test]
    fn test_stock_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StockStatus::Amarillo).unwrap(),
            "\"amarillo\""
        );
    }

    #[test]
    fn test_cart_total() {
        let cart = Cart::new(vec![
            CartLine {
                recipe_id: RecipeId(1),
                quantity: 2,
                unit_price: Money::from_cents(10000),
            },
            CartLine {
                recipe_id: RecipeId(2),
                quantity: 1,
                unit_price: Money::from_cents(15050),
            },
        ]);

        assert_eq!(cart.total(), Some(Money::from_cents(35050)));
        assert_eq!(cart.recipe_ids(), vec![RecipeId(1), RecipeId(2)]);
    }

    #[test]
    fn test_cart_total_overflow() {
        let cart = Cart::new(vec![CartLine {
            recipe_id: RecipeId(1),
            quantity: 999,
            unit_price: Money::from_cents(i64::MAX / 10),
        }]);
        assert_eq!(cart.total(), None);
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&RecipeId(7)).unwrap(), "7");
        assert_eq!(RecipeId::from(7), RecipeId(7));
        assert_eq!(SaleId(42).to_string(), "42");
    }
}
