// HTTP handlers for checkout preview and GST administration

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::cart::CartError;
use crate::coupons::AppliedType;
use crate::pricing::{GstSettings, PriceBreakdown, PricingError, UpdateGstRequest};
use crate::AppState;

/// Request DTO for the checkout preview
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutPreviewRequest {
    /// Coupon code to apply; when absent the best auto-apply coupon is used
    pub coupon_code: Option<String>,
}

/// Checkout preview response. `coupon_rejected` carries the reason when the
/// requested code was not applicable; the breakdown is then coupon-free.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutPreviewResponse {
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub applied_type: Option<AppliedType>,
    pub coupon_rejected: Option<String>,
}

/// Failures on the preview path: cart problems and pricing problems each
/// keep their own status mapping.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl IntoResponse for PreviewError {
    fn into_response(self) -> Response {
        match self {
            PreviewError::Cart(err) => err.into_response(),
            PreviewError::Pricing(err) => err.into_response(),
        }
    }
}

/// Handler for POST /api/checkout/preview
/// Prices the caller's cart. A rejected coupon code downgrades to a
/// coupon-free breakdown with the rejection reason attached, so the
/// storefront can show the totals and the error together.
#[utoipa::path(
    post,
    path = "/api/checkout/preview",
    request_body = CheckoutPreviewRequest,
    responses(
        (status = 200, description = "Price breakdown", body = CheckoutPreviewResponse),
        (status = 400, description = "Empty cart"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "checkout"
)]
pub async fn checkout_preview_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CheckoutPreviewRequest>,
) -> Result<Json<CheckoutPreviewResponse>, PreviewError> {
    let (_items, lines) = state.cart_service.priced_lines(user.user_id).await?;

    let coupon_code = request.coupon_code.as_deref();
    match state
        .pricing_service
        .quote(&lines, user.user_id, coupon_code)
        .await
    {
        Ok(quote) => Ok(Json(CheckoutPreviewResponse {
            applied_type: quote.coupon.as_ref().map(|c| c.applied_type),
            breakdown: quote.breakdown,
            coupon_rejected: None,
        })),
        Err(PricingError::Coupon(reason)) if coupon_code.is_some() => {
            // Keep the preview usable: reprice without the coupon and
            // surface why it was dropped
            let quote = state.pricing_service.quote_without_coupon(&lines).await?;
            Ok(Json(CheckoutPreviewResponse {
                breakdown: quote.breakdown,
                applied_type: None,
                coupon_rejected: Some(reason.to_string()),
            }))
        }
        Err(err) => Err(err.into()),
    }
}

/// Handler for GET /api/admin/settings/gst
pub async fn get_gst_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<GstSettings>, PricingError> {
    let settings = state.pricing_service.gst_repository().get().await?;
    Ok(Json(settings))
}

/// Handler for PUT /api/admin/settings/gst
pub async fn update_gst_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<UpdateGstRequest>,
) -> Result<Json<GstSettings>, PricingError> {
    if request.gst_percentage < rust_decimal::Decimal::ZERO
        || request.gst_percentage > rust_decimal::Decimal::from(100)
    {
        return Err(PricingError::InvalidGstRate);
    }

    let settings = state
        .pricing_service
        .gst_repository()
        .update(request.gst_percentage)
        .await?;
    Ok(Json(settings))
}
