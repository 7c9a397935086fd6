//! # Sale Engine
//!
//! Turns a validated cart into a committed sale, or into an error with no
//! side effects.
//!
//! ## Commit Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit_sale(cart)                                                      │
//! │                                                                         │
//! │  0. validate_cart            ── InvalidCart        (nothing opened)     │
//! │           │                                                             │
//! │  begin transaction ─────────────────────────────────────────────┐      │
//! │           │                                                      │      │
//! │  1. resolve recipes          ── RecipeNotFound                   │      │
//! │  2. build ConsumptionPlan    (shared ingredients summed)         │      │
//! │  3. fetch stock, compare     ── InsufficientStock                │      │
//! │  4. append sale + lines,                                         │      │
//! │     decrement plan           ── Storage                          │      │
//! │           │                                                      │      │
//! │  commit ◄────────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! │  Any error before commit drops the transaction: stock and ledger stay   │
//! │  exactly as they were.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::consumption::ConsumptionPlan;
use crate::error::{SaleError, ValidationError};
use crate::store::{CatalogStore, RecipeStore, SaleLedger, SaleStore, SaleTransaction};
use crate::types::{Cart, NewSale, SaleLine, SaleReceipt};
use crate::validation::validate_cart;

/// The sale commit engine over a [`SaleStore`].
#[derive(Debug, Clone)]
pub struct SaleEngine<S> {
    store: S,
}

impl<S: SaleStore> SaleEngine<S> {
    pub fn new(store: S) -> Self {
        SaleEngine { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records the sale and decrements stock if, and only if, every
    /// ingredient of the whole cart is sufficient.
    ///
    /// No retries: a failed commit is reported as is.
    pub async fn commit_sale(&self, cart: &Cart) -> Result<SaleReceipt, SaleError> {
        let result = self.try_commit(cart).await;

        match &result {
            Ok(receipt) => info!(
                sale_id = %receipt.sale_id,
                total = %receipt.total_amount,
                lines = receipt.lines.len(),
                "Sale committed"
            ),
            Err(SaleError::Storage(err)) => error!(error = %err, "Sale failed on storage"),
            Err(err) => warn!(error = %err, "Sale rejected"),
        }

        result
    }

    async fn try_commit(&self, cart: &Cart) -> Result<SaleReceipt, SaleError> {
        validate_cart(cart)?;

        let mut tx = self.store.begin().await?;

        // Phase 1: resolve every recipe before touching stock
        let recipe_ids = cart.recipe_ids();
        let recipes = tx.recipes_by_ids(&recipe_ids).await?;
        if let Some(missing) = recipe_ids.iter().find(|id| !recipes.contains_key(id)) {
            return Err(SaleError::RecipeNotFound(*missing));
        }

        // Phase 2
        let plan = ConsumptionPlan::build(cart, &recipes)?;
        debug!(ingredients = plan.len(), "Consumption plan built");

        // Phase 3
        let stock = tx.ingredients_by_ids(&plan.ingredient_ids()).await?;
        plan.check_sufficiency(&stock)?;

        // Phase 4
        let total_amount = cart.total().ok_or_else(|| {
            SaleError::InvalidCart(ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            })
        })?;

        let mut lines = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let recipe = recipes
                .get(&line.recipe_id)
                .ok_or(SaleError::RecipeNotFound(line.recipe_id))?;
            lines.push(SaleLine {
                recipe_id: line.recipe_id,
                recipe_name: recipe.name.clone(),
                size: recipe.size,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.unit_price * line.quantity,
            });
        }

        let sale = NewSale {
            total_amount,
            created_at: Utc::now(),
            lines,
        };

        let sale_id = tx.append_sale(&sale).await?;
        tx.decrement_stock(plan.as_map()).await?;
        tx.commit().await?;

        Ok(SaleReceipt {
            sale_id,
            total_amount: sale.total_amount,
            created_at: sale.created_at,
            lines: sale.lines,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
