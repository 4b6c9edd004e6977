use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rust_decimal::Decimal;
use serde_json::json;

/// Coupon eligibility failures. Each carries the human-readable reason shown
/// to the customer; at preview the caller recovers by dropping the discount,
/// at commit the same failure aborts the order attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CouponError {
    #[error("Invalid coupon code")]
    NotFound,

    #[error("This coupon is no longer active")]
    Inactive,

    #[error("This coupon has expired")]
    Expired,

    #[error("Minimum order value ₹{0} not met")]
    BelowMinimum(Decimal),

    #[error("This coupon has reached its usage limit")]
    UsageLimitReached,

    #[error("You have already used this coupon")]
    AlreadyUsedByUser,

    #[error("{0}")]
    InvalidRule(String),

    #[error("Coupon code {0} already exists")]
    CodeConflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CouponError {
    fn from(err: sqlx::Error) -> Self {
        CouponError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            CouponError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            CouponError::CodeConflict(_) => (StatusCode::CONFLICT, self.to_string()),
            CouponError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            _ => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
