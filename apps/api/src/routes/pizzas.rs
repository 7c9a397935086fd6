//! # Pizza Routes
//!
//! Recipe catalog, the point-of-sale commit and the daily report.
//!
//! ```text
//! GET    /api/pizzas                  list recipes with ingredients
//! POST   /api/pizzas                  create recipe
//! PUT    /api/pizzas/:id              replace recipe
//! DELETE /api/pizzas/:id              delete recipe
//! POST   /api/pizzas/ventas           commit a sale
//! GET    /api/pizzas/reporte-diario   sales since local midnight (or ?since=)
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use pizzatrack_core::store::SaleStore;
use pizzatrack_core::validation::validate_new_recipe;
use pizzatrack_core::{IngredientId, NewRecipe, RecipeId, ValidationError};

use crate::dto::{
    DailyReportView, DataResponse, MessageResponse, RecipePayload, RecipeSaved, RecipeView,
    SaleRequest, SaleResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::routes::method_not_allowed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/pizzas",
            get(list_recipes).post(create_recipe).fallback(method_not_allowed),
        )
        .route(
            "/api/pizzas/ventas",
            post(commit_sale).fallback(method_not_allowed),
        )
        .route(
            "/api/pizzas/reporte-diario",
            get(daily_report).fallback(method_not_allowed),
        )
        .route(
            "/api/pizzas/:id",
            put(update_recipe).delete(delete_recipe).fallback(method_not_allowed),
        )
}

// =============================================================================
// Recipes
// =============================================================================

async fn list_recipes(State(state): State<AppState>) -> ApiResult<Json<DataResponse<Vec<RecipeView>>>> {
    let recipes = state.db.recipes().list_detailed().await?;
    debug!(count = recipes.len(), "Recipes listed");

    Ok(Json(DataResponse::new(
        recipes.into_iter().map(RecipeView::from).collect(),
    )))
}

/// Validates the payload and checks every referenced ingredient exists.
async fn checked_recipe(state: &AppState, payload: RecipePayload) -> ApiResult<NewRecipe> {
    let recipe = validate_new_recipe(&NewRecipe::from(payload))?;

    let ids: Vec<IngredientId> = recipe.lines.iter().map(|l| l.ingredient_id).collect();
    let found = state.db.ingredients().get_many(&ids).await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
        return Err(ValidationError::InvalidFormat {
            field: "id_producto".to_string(),
            reason: format!("ingredient {missing} does not exist"),
        }
        .into());
    }

    Ok(recipe)
}

async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeSaved>)> {
    let Json(payload) = payload?;
    let recipe = checked_recipe(&state, payload).await?;

    let created = state.db.recipes().insert(&recipe).await?;
    info!(id = %created.id, name = %created.name, size = %created.size, "Recipe created");

    Ok((
        StatusCode::CREATED,
        Json(RecipeSaved::new("Receta creada exitosamente.", created.id)),
    ))
}

async fn update_recipe(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecipePayload>, JsonRejection>,
) -> ApiResult<Json<RecipeSaved>> {
    let id = RecipeId(id?.0);
    let Json(payload) = payload?;
    let recipe = checked_recipe(&state, payload).await?;

    state.db.recipes().update(id, &recipe).await?;
    info!(id = %id, "Recipe updated");

    Ok(Json(RecipeSaved::new("Receta actualizada exitosamente.", id)))
}

async fn delete_recipe(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = RecipeId(id?.0);

    state.db.recipes().delete(id).await?;
    info!(id = %id, "Recipe deleted");

    Ok(Json(MessageResponse::new("Receta eliminada exitosamente.")))
}

// =============================================================================
// Sale
// =============================================================================

async fn commit_sale(
    State(state): State<AppState>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SaleResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::new(StatusCode::BAD_REQUEST, "invalid_cart", rejection.body_text())
    })?;

    let receipt = state.sales.commit_sale(&request.into_cart()).await?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from(receipt))))
}

// =============================================================================
// Daily report
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReportQuery {
    /// RFC 3339; defaults to the start of the current local day.
    since: Option<DateTime<Utc>>,
}

/// Local midnight of `now`'s day, in UTC.
fn start_of_local_day(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(chrono::NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        // midnight skipped by a DST jump
        .unwrap_or_else(|| midnight.and_utc())
}

async fn daily_report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<DailyReportView>>> {
    let Query(query) = query
        .map_err(|rejection| ApiError::new(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text()))?;
    let since = query.since.unwrap_or_else(|| start_of_local_day(Local::now()));

    let report = state.sales.store().sales_report(since).await?;
    debug!(since = %since, orders = report.order_count, "Daily report");

    Ok(Json(DataResponse::new(DailyReportView::from(report))))
}
