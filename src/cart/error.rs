use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Cart operation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("Size {0} is not available for this product")]
    SizeUnavailable(String),

    #[error("Only {available} left in stock")]
    InsufficientStock { available: i32 },

    #[error("Cart item not found")]
    ItemNotFound,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        CartError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CartError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CartError::ValidationError(errors.to_string())
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CartError::ProductNotFound | CartError::ItemNotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            CartError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            _ => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
