//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► TraceLayer ──► CorsLayer ──► Router                        │
//! │                                             ├── /health                 │
//! │                                             ├── pizzas::router()        │
//! │                                             ├── almacen::router()       │
//! │                                             └── fallback  404 JSON      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unsupported methods on a known path answer 405 with the same JSON error
//! body as every other failure.

pub mod almacen;
pub mod pizzas;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::state::AppState;

/// Builds the complete application router.
pub fn build_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .merge(pizzas::router())
        .merge(almacen::router())
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin; anything else must be a single valid origin.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, ConfigError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let value = HeaderValue::from_str(origin.trim())
        .map_err(|_| ConfigError::InvalidValue("PIZZATRACK_CORS_ORIGIN".to_string()))?;
    Ok(layer.allow_origin(value))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "success": database,
            "status": if database { "ok" } else { "degraded" },
            "database": database,
        })),
    )
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Ruta no encontrada.")
}
