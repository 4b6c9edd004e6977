use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Error types for shipping tier configuration and lookup
#[derive(Debug, thiserror::Error)]
pub enum ShippingConfigError {
    #[error("Min amount cannot be negative")]
    NegativeMinAmount,

    #[error("Shipping charge cannot be negative")]
    NegativeCharge,

    #[error("Max amount must be greater than min amount")]
    InvertedRange,

    #[error("Tier range overlap: {0}")]
    RangeOverlap(String),

    #[error("Shipping tier not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for ShippingConfigError {
    fn from(err: sqlx::Error) -> Self {
        ShippingConfigError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for ShippingConfigError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ShippingConfigError::NotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ShippingConfigError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            _ => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
