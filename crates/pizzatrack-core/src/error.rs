//! # Error Types
//!
//! Domain-specific error types for pizzatrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pizzatrack-core errors (this file)                                    │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── StoreError       - What a store port reports                      │
//! │  └── SaleError        - Why a sale was not committed                   │
//! │                                                                         │
//! │  pizzatrack-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures → StoreError       │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - HTTP status + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError ─┐                                              │
//! │        StoreError ──────┴─► SaleError ──► ApiError ──► Console         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `SaleError` means nothing was written: the engine only returns one
//! before its transaction commits.

use thiserror::Error;

use crate::quantity::Quantity;
use crate::types::{IngredientId, RecipeId};

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary, before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (unparseable decimal, malformed JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The same id appears twice where it must be unique.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },

    /// Collection has more entries than allowed.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a store port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A decrement or update addressed a row that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The guarded decrement found less stock than the plan required.
    ///
    /// ## When This Occurs
    /// Only when another writer changed stock between the sufficiency
    /// check and the decrement, which transaction isolation normally rules
    /// out. The whole transaction is abandoned.
    #[error("stock of ingredient {0} changed during the sale")]
    StockConflict(IngredientId),

    /// Anything the backend could not do (I/O, pool, constraint).
    #[error("storage failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Sale Error
// =============================================================================

/// Why a cart was not turned into a sale.
///
/// ## User Workflow
/// ```text
/// POST /api/pizzas/ventas
///      │
///      ├── InvalidCart        ──► 400  "quantity must be positive"
///      ├── RecipeNotFound     ──► 404  "Recipe 999 not found"
///      ├── InsufficientStock  ──► 409  "Queso: required 12, available 10"
///      └── Storage            ──► 500  (details logged only)
/// ```
#[derive(Debug, Error)]
pub enum SaleError {
    /// Empty cart, non-positive quantity, negative price, duplicate recipe.
    #[error("invalid cart: {0}")]
    InvalidCart(#[from] ValidationError),

    #[error("Recipe {0} not found")]
    RecipeNotFound(RecipeId),

    /// A recipe references an ingredient missing from the catalog.
    #[error("Ingredient {0} referenced by a recipe does not exist")]
    IngredientNotFound(IngredientId),

    /// Cumulative requirement of the cart exceeds the stock on hand.
    #[error("Insufficient stock of {name} (ingredient {ingredient_id}): required {required}, available {available}")]
    InsufficientStock {
        ingredient_id: IngredientId,
        name: String,
        required: Quantity,
        available: Quantity,
    },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = SaleError::InsufficientStock {
            ingredient_id: IngredientId(1),
            name: "Queso".to_string(),
            required: Quantity::from_units(12),
            available: Quantity::from_units(10),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock of Queso (ingredient 1): required 12, available 10"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items is required");

        let err = ValidationError::Duplicate {
            field: "id_receta".to_string(),
            value: "3".to_string(),
        };
        assert_eq!(err.to_string(), "id_receta '3' appears more than once");
    }

    #[test]
    fn test_conversions_into_sale_error() {
        let err: SaleError = ValidationError::Required {
            field: "items".to_string(),
        }
        .into();
        assert!(matches!(err, SaleError::InvalidCart(_)));

        let err: SaleError = StoreError::Backend("disk full".to_string()).into();
        assert!(matches!(err, SaleError::Storage(_)));
        assert_eq!(err.to_string(), "storage failure: disk full");
    }
}
