//! # Almacén Routes
//!
//! Ingredient inventory CRUD.
//!
//! ```text
//! GET    /api/almacen        list, alphabetical, with stock status
//! POST   /api/almacen        create                      201 { id }
//! PUT    /api/almacen/:id    replace all fields          200 / 404
//! DELETE /api/almacen/:id    delete                      200 / 404 / 409 (in use)
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::info;

use pizzatrack_core::validation::validate_new_ingredient;
use pizzatrack_core::{IngredientId, NewIngredient};

use crate::dto::{DataResponse, IngredientPayload, IngredientView, MessageResponse};
use crate::error::ApiResult;
use crate::routes::method_not_allowed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/almacen",
            get(list_ingredients)
                .post(create_ingredient)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/almacen/:id",
            put(update_ingredient)
                .delete(delete_ingredient)
                .fallback(method_not_allowed),
        )
}

async fn list_ingredients(
    State(state): State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<IngredientView>>>> {
    let ingredients = state.db.ingredients().list().await?;

    Ok(Json(DataResponse::new(
        ingredients.into_iter().map(IngredientView::from).collect(),
    )))
}

async fn create_ingredient(
    State(state): State<AppState>,
    payload: Result<Json<IngredientPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let ingredient = validate_new_ingredient(&NewIngredient::from(payload))?;

    let created = state.db.ingredients().insert(&ingredient).await?;
    info!(id = %created.id, name = %created.name, "Ingredient created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Producto creado exitosamente.").with_id(created.id.get())),
    ))
}

async fn update_ingredient(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<IngredientPayload>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = IngredientId(id?.0);
    let Json(payload) = payload?;
    let ingredient = validate_new_ingredient(&NewIngredient::from(payload))?;

    state.db.ingredients().update(id, &ingredient).await?;
    info!(id = %id, "Ingredient updated");

    Ok(Json(MessageResponse::new("Producto actualizado exitosamente.")))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = IngredientId(id?.0);

    state.db.ingredients().delete(id).await?;
    info!(id = %id, "Ingredient deleted");

    Ok(Json(MessageResponse::new("Producto eliminado exitosamente.")))
}
