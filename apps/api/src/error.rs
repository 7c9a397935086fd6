//! # API Errors
//!
//! Every failure a handler can produce becomes an [`ApiError`]: an HTTP
//! status, a machine-readable code and a message for the console.
//!
//! ## Status Mapping
//! ```text
//! SaleError::InvalidCart           400  invalid_cart
//! SaleError::RecipeNotFound        404  recipe_not_found
//! SaleError::IngredientNotFound    404  ingredient_not_found
//! SaleError::InsufficientStock     409  insufficient_stock
//! StoreError::StockConflict        409  stock_conflict
//! StoreError::* / DbError::*       500  storage_error   (details logged only)
//! ValidationError                  400  validation_error
//! DbError::NotFound                404  not_found
//! DbError::UniqueViolation         409  duplicate
//! DbError::ForeignKeyViolation     409  in_use
//! malformed JSON / path            400  invalid_json / invalid_id
//! ```
//!
//! ## Body
//! ```json
//! { "success": false, "code": "insufficient_stock", "message": "..." }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use pizzatrack_core::{SaleError, StoreError, ValidationError};
use pizzatrack_db::DbError;

const INTERNAL_MESSAGE: &str = "Error interno del servidor.";

/// An error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed", "Método no soportado.")
    }

    /// 500 with a generic message; `detail` goes to the log only.
    fn internal(code: &'static str, detail: impl std::fmt::Display) -> Self {
        error!(code, error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "code": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        let message = err.to_string();
        match err {
            SaleError::InvalidCart(_) => Self::new(StatusCode::BAD_REQUEST, "invalid_cart", message),
            SaleError::RecipeNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "recipe_not_found", message)
            }
            SaleError::IngredientNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, "ingredient_not_found", message)
            }
            SaleError::InsufficientStock { .. } => {
                Self::new(StatusCode::CONFLICT, "insufficient_stock", message)
            }
            SaleError::Storage(StoreError::StockConflict(_)) => {
                Self::new(StatusCode::CONFLICT, "stock_conflict", message)
            }
            SaleError::Storage(other) => Self::internal("storage_error", other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        SaleError::Storage(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => Self::not_found(err.to_string()),
            DbError::UniqueViolation { .. } => {
                Self::new(StatusCode::CONFLICT, "duplicate", err.to_string())
            }
            DbError::ForeignKeyViolation { .. } => Self::new(
                StatusCode::CONFLICT,
                "in_use",
                "El registro está en uso por otra entidad.",
            ),
            DbError::CheckViolation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "constraint_violation", err.to_string())
            }
            other => Self::internal("storage_error", other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_id", rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
