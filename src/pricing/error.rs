use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::coupons::CouponError;
use crate::shipping::ShippingConfigError;

/// Failures while assembling a price quote. Wraps the per-domain errors so
/// callers keep their specific status mapping.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Shipping(#[from] ShippingConfigError),

    #[error("GST percentage must be between 0 and 100")]
    InvalidGstRate,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for PricingError {
    fn from(err: sqlx::Error) -> Self {
        PricingError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        match self {
            PricingError::Coupon(err) => err.into_response(),
            PricingError::Shipping(err) => err.into_response(),
            PricingError::InvalidGstRate => {
                let body = Json(json!({ "error": "GST percentage must be between 0 and 100" }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            PricingError::DatabaseError(msg) => {
                let body = Json(json!({ "error": msg }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
