//! # Wire Types
//!
//! JSON shapes of the admin console. Field names are the console's
//! (`id_receta`, `tamano`, `cantidad_uso`, ...); amounts travel as JSON
//! numbers and are read without going through floating point.
//!
//! ## Mapping
//! ```text
//! SaleRequest          ──► Cart                 POST /api/pizzas/ventas
//! RecipePayload        ──► NewRecipe            POST/PUT /api/pizzas
//! IngredientPayload    ──► NewIngredient        POST/PUT /api/almacen
//! RecipeDetail         ──► RecipeView           GET /api/pizzas
//! Ingredient           ──► IngredientView       GET /api/almacen
//! SalesReport          ──► DailyReportView      GET /api/pizzas/reporte-diario
//! ```

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use pizzatrack_core::{
    money, quantity, Cart, CartLine, Ingredient, IngredientId, Money, NewIngredient, NewRecipe,
    PizzaSize, Quantity, RecipeDetail, RecipeId, RecipeLine, SaleId, SaleReceipt, SalesReport,
    StockStatus,
};

/// Accepts "Mediana", "mediana", " GRANDE ".
fn deserialize_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PizzaSize, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse()
        .map_err(|bad: String| de::Error::custom(format!("unknown size '{bad}', expected Mediana or Grande")))
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SaleItem {
    pub id_receta: RecipeId,
    pub quantity: i64,
    #[serde(with = "money::decimal")]
    pub price: Money,
}

/// `{ "items": [{ "id_receta": 1, "quantity": 2, "price": 189.0 }] }`
#[derive(Debug, Clone, Deserialize)]
pub struct SaleRequest {
    pub items: Vec<SaleItem>,
}

impl SaleRequest {
    pub fn into_cart(self) -> Cart {
        Cart::new(
            self.items
                .into_iter()
                .map(|item| CartLine {
                    recipe_id: item.id_receta,
                    quantity: item.quantity,
                    unit_price: item.price,
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleResponse {
    pub success: bool,
    pub message: String,
    pub id_venta: SaleId,
    #[serde(with = "money::decimal")]
    pub total: Money,
    pub fecha: DateTime<Utc>,
}

impl From<SaleReceipt> for SaleResponse {
    fn from(receipt: SaleReceipt) -> Self {
        SaleResponse {
            success: true,
            message: "Venta registrada y stock actualizado con éxito.".to_string(),
            id_venta: receipt.sale_id,
            total: receipt.total_amount,
            fecha: receipt.created_at,
        }
    }
}

// =============================================================================
// Recipes
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeLinePayload {
    pub id_producto: IngredientId,
    #[serde(with = "quantity::decimal")]
    pub cantidad_uso: Quantity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipePayload {
    pub nombre: String,
    #[serde(deserialize_with = "deserialize_size")]
    pub tamano: PizzaSize,
    #[serde(with = "money::decimal")]
    pub precio: Money,
    #[serde(default)]
    pub ingredientes: Vec<RecipeLinePayload>,
}

impl From<RecipePayload> for NewRecipe {
    fn from(payload: RecipePayload) -> Self {
        NewRecipe {
            name: payload.nombre,
            size: payload.tamano,
            unit_price: payload.precio,
            lines: payload
                .ingredientes
                .into_iter()
                .map(|line| RecipeLine {
                    ingredient_id: line.id_producto,
                    quantity_per_unit: line.cantidad_uso,
                })
                .collect(),
        }
    }
}

/// Reply to recipe create and update; the console reads `id_receta`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSaved {
    pub success: bool,
    pub message: String,
    pub id_receta: RecipeId,
}

impl RecipeSaved {
    pub fn new(message: impl Into<String>, id_receta: RecipeId) -> Self {
        RecipeSaved {
            success: true,
            message: message.into(),
            id_receta,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeIngredientView {
    pub id_producto: IngredientId,
    pub producto_nombre: String,
    #[serde(with = "quantity::decimal")]
    pub cantidad_uso: Quantity,
    pub unidad_medida: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id_receta: RecipeId,
    pub nombre: String,
    pub tamano: PizzaSize,
    #[serde(with = "money::decimal")]
    pub precio: Money,
    pub ingredientes: Vec<RecipeIngredientView>,
}

impl From<RecipeDetail> for RecipeView {
    fn from(detail: RecipeDetail) -> Self {
        RecipeView {
            id_receta: detail.id,
            nombre: detail.name,
            tamano: detail.size,
            precio: detail.unit_price,
            ingredientes: detail
                .ingredients
                .into_iter()
                .map(|i| RecipeIngredientView {
                    id_producto: i.ingredient_id,
                    producto_nombre: i.name,
                    cantidad_uso: i.quantity_per_unit,
                    unidad_medida: i.unit_of_measure,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Daily report
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ReportLineView {
    pub id_receta: RecipeId,
    pub total_vendido: i64,
    pub nombre: String,
    pub tamano: PizzaSize,
    #[serde(with = "money::decimal")]
    pub importe: Money,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReportView {
    pub desde: DateTime<Utc>,
    #[serde(with = "money::decimal")]
    pub total_ventas: Money,
    pub total_ordenes: i64,
    pub detalle: Vec<ReportLineView>,
}

impl From<SalesReport> for DailyReportView {
    fn from(report: SalesReport) -> Self {
        DailyReportView {
            desde: report.since,
            total_ventas: report.total_sales,
            total_ordenes: report.order_count,
            detalle: report
                .by_recipe
                .into_iter()
                .map(|line| ReportLineView {
                    id_receta: line.recipe_id,
                    total_vendido: line.pizzas_sold,
                    nombre: line.name,
                    tamano: line.size,
                    importe: line.revenue,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Almacén
// =============================================================================

/// Create / update body. `precio` may be a number or text such as "$1,250.00".
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientPayload {
    pub producto: String,
    #[serde(with = "quantity::decimal")]
    pub items: Quantity,
    pub especificacion: String,
    #[serde(with = "money::decimal")]
    pub precio: Money,
}

impl From<IngredientPayload> for NewIngredient {
    fn from(payload: IngredientPayload) -> Self {
        NewIngredient {
            name: payload.producto,
            unit_of_measure: payload.especificacion,
            stock: payload.items,
            unit_cost: payload.precio,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    pub id: IngredientId,
    pub producto: String,
    #[serde(with = "quantity::decimal")]
    pub items: Quantity,
    pub especificacion: String,
    /// Formatted, e.g. "$165.00"
    pub precio: String,
    pub estatus: StockStatus,
}

impl From<Ingredient> for IngredientView {
    fn from(ingredient: Ingredient) -> Self {
        IngredientView {
            estatus: ingredient.stock_status(),
            id: ingredient.id,
            producto: ingredient.name,
            items: ingredient.stock,
            especificacion: ingredient.unit_of_measure,
            precio: ingredient.unit_cost.to_string(),
        }
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// `{ "success": true, "data": ... }`
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        DataResponse {
            success: true,
            data,
        }
    }
}

/// `{ "success": true, "message": ..., "id": ... }` for writes.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}
