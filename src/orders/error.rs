use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::coupons::CouponError;

/// Order placement and lifecycle failures
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Your cart is empty")]
    EmptyOrder,

    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: i32 },

    #[error("This coupon was just used up, please try again")]
    CouponRaceLost,

    #[error(transparent)]
    CouponRejected(#[from] CouponError),

    #[error("Order not found")]
    NotFound,

    #[error("You do not have access to this order")]
    Forbidden,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OrderError::ValidationError(errors.to_string())
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            OrderError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            OrderError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            OrderError::CouponRaceLost => (StatusCode::CONFLICT, self.to_string()),
            OrderError::OutOfStock { .. } => (StatusCode::CONFLICT, self.to_string()),
            OrderError::CouponRejected(err) => return err.into_response(),
            OrderError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            _ => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
