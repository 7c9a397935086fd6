//! # Consumption Plan
//!
//! Total ingredient requirement of a cart, aggregated before any stock is
//! compared.
//!
//! ```text
//! Cart                         Recipes (per pizza)         Plan
//! ─────────────────────        ───────────────────         ─────────────────
//! Margarita   × 2       ──►    queso 3 kg          ──┐
//!                              salsa 0.5 lt          │     queso  8 kg
//! Cuatro Q.   × 1       ──►    queso 2 kg          ──┴─►   salsa  1 lt
//! ```
//!
//! Checking each line against stock on its own would let two lines that
//! share an ingredient each pass while their sum does not fit. The plan is
//! what gets checked, and what gets decremented.

use std::collections::{BTreeMap, HashMap};

use crate::error::{SaleError, ValidationError};
use crate::quantity::Quantity;
use crate::types::{Cart, Ingredient, IngredientId, Recipe, RecipeId};

/// Mapping ingredient → cumulative required quantity.
///
/// Keys are ordered so checks and decrements always walk ingredients in
/// ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionPlan {
    required: BTreeMap<IngredientId, Quantity>,
}

impl ConsumptionPlan {
    /// Single pass over the cart summing `quantity_per_unit × line.quantity`.
    ///
    /// `recipes` must hold every recipe the cart names.
    pub fn build(cart: &Cart, recipes: &HashMap<RecipeId, Recipe>) -> Result<Self, SaleError> {
        let mut required: BTreeMap<IngredientId, Quantity> = BTreeMap::new();

        for line in &cart.lines {
            let recipe = recipes
                .get(&line.recipe_id)
                .ok_or(SaleError::RecipeNotFound(line.recipe_id))?;

            for recipe_line in &recipe.lines {
                let amount = recipe_line
                    .quantity_per_unit
                    .checked_times(line.quantity)
                    .ok_or_else(overflow)?;

                let total = required.entry(recipe_line.ingredient_id).or_default();
                *total = total.checked_add(amount).ok_or_else(overflow)?;
            }
        }

        Ok(ConsumptionPlan { required })
    }

    /// Required quantity of one ingredient, if the cart uses it at all.
    pub fn required(&self, ingredient_id: IngredientId) -> Option<Quantity> {
        self.required.get(&ingredient_id).copied()
    }

    /// Every ingredient the cart consumes, ascending.
    pub fn ingredient_ids(&self) -> Vec<IngredientId> {
        self.required.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IngredientId, Quantity)> + '_ {
        self.required.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn as_map(&self) -> &BTreeMap<IngredientId, Quantity> {
        &self.required
    }

    pub fn len(&self) -> usize {
        self.required.len()
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty()
    }

    /// Compares every requirement against the stock snapshot.
    ///
    /// Reports the first failing ingredient in ascending id order so the
    /// same cart against the same stock always yields the same error.
    pub fn check_sufficiency(
        &self,
        stock: &HashMap<IngredientId, Ingredient>,
    ) -> Result<(), SaleError> {
        for (ingredient_id, required) in self.iter() {
            let ingredient = stock
                .get(&ingredient_id)
                .ok_or(SaleError::IngredientNotFound(ingredient_id))?;

            if ingredient.stock < required {
                return Err(SaleError::InsufficientStock {
                    ingredient_id,
                    name: ingredient.name.clone(),
                    required,
                    available: ingredient.stock,
                });
            }
        }

        Ok(())
    }
}

fn overflow() -> SaleError {
    SaleError::InvalidCart(ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: crate::MAX_ITEM_QUANTITY,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
