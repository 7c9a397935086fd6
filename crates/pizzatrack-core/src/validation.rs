//! # Validation Module
//!
//! Business rule validation for carts, recipes and ingredients.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin console (React)                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: apps/api (Rust)                                              │
//! │  ├── Type validation (JSON deserialization, decimals)                  │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_milli >= 0), CHECK (quantity > 0)                    │
//! │  ├── UNIQUE (name, size)                                               │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pizzatrack_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(2).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{Cart, NewIngredient, NewRecipe};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_RECIPE_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_UNIT_LEN: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use pizzatrack_core::validation::validate_name;
///
/// assert_eq!(validate_name("nombre", "  Hawaiana ").unwrap(), "Hawaiana");
/// assert!(validate_name("nombre", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    validate_text(field, name, MAX_NAME_LEN)
}

/// Validates a unit of measure ("kg", "lt", "unidad").
pub fn validate_unit_of_measure(unit: &str) -> ValidationResult<String> {
    validate_text("unit_of_measure", unit, MAX_UNIT_LEN)
}

fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the number of pizzas on a cart line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (courtesy pizza), negative is not.
///
/// ## Example
/// ```rust
/// use pizzatrack_core::money::Money;
/// use pizzatrack_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(0)).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level entered through the inventory form.
pub fn validate_stock(stock: Quantity) -> ValidationResult<()> {
    if stock.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Cart Validation
// =============================================================================

/// Validates a cart before the engine opens a transaction.
///
/// ## Rules
/// - At least one line, at most MAX_CART_ITEMS
/// - Every quantity in 1..=MAX_ITEM_QUANTITY
/// - No negative unit price
/// - A recipe id appears at most once
/// - The total fits in the money type
///
/// ## User Workflow
/// ```text
/// {"items": [{"id_receta": 1, "quantity": 2, "price": 100}]}
///      │  (JSON → Cart)
///      ▼
/// validate_cart ← THIS FUNCTION
///      │
///      ├── Err ──► SaleError::InvalidCart ──► 400, nothing read
///      │
///      └── Ok  ──► SaleEngine phase 1 (resolve recipes)
/// ```
pub fn validate_cart(cart: &Cart) -> ValidationResult<()> {
    if cart.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if cart.lines.len() > MAX_CART_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_CART_ITEMS,
        });
    }

    let mut seen = HashSet::with_capacity(cart.lines.len());
    for line in &cart.lines {
        validate_quantity(line.quantity)?;
        validate_price("price", line.unit_price)?;

        if !seen.insert(line.recipe_id) {
            return Err(ValidationError::Duplicate {
                field: "id_receta".to_string(),
                value: line.recipe_id.to_string(),
            });
        }
    }

    if cart.total().is_none() {
        return Err(ValidationError::OutOfRange {
            field: "total".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validation
// =============================================================================

/// Validates a recipe and returns it with its name trimmed.
///
/// Ingredient ids are not looked up here; the API checks them against the
/// almacén before saving and answers 400 for an unknown one.
pub fn validate_new_recipe(recipe: &NewRecipe) -> ValidationResult<NewRecipe> {
    let name = validate_name("nombre", &recipe.name)?;
    validate_price("precio", recipe.unit_price)?;

    if recipe.lines.is_empty() {
        return Err(ValidationError::Required {
            field: "ingredientes".to_string(),
        });
    }

    if recipe.lines.len() > MAX_RECIPE_LINES {
        return Err(ValidationError::TooMany {
            field: "ingredientes".to_string(),
            max: MAX_RECIPE_LINES,
        });
    }

    let mut seen = HashSet::with_capacity(recipe.lines.len());
    for line in &recipe.lines {
        if !line.quantity_per_unit.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "cantidad_uso".to_string(),
            });
        }
        if !seen.insert(line.ingredient_id) {
            return Err(ValidationError::Duplicate {
                field: "id_producto".to_string(),
                value: line.ingredient_id.to_string(),
            });
        }
    }

    Ok(NewRecipe {
        name,
        ..recipe.clone()
    })
}

/// Validates an ingredient and returns it with its text fields trimmed.
pub fn validate_new_ingredient(ingredient: &NewIngredient) -> ValidationResult<NewIngredient> {
    let name = validate_name("producto", &ingredient.name)?;
    let unit_of_measure = validate_unit_of_measure(&ingredient.unit_of_measure)?;
    validate_stock(ingredient.stock)?;
    validate_price("precio", ingredient.unit_cost)?;

    Ok(NewIngredient {
        name,
        unit_of_measure,
        stock: ingredient.stock,
        unit_cost: ingredient.unit_cost,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
