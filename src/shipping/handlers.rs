// HTTP handlers for shipping tier endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::shipping::{
    resolve_shipping, CreateTierRequest, ShippingConfigError, ShippingTier, UpdateTierRequest,
};
use crate::AppState;

/// Query parameters for the public shipping calculation
#[derive(Debug, Deserialize)]
pub struct CalculateQuery {
    pub subtotal: Decimal,
}

/// Response for the public shipping calculation
#[derive(Debug, Serialize, ToSchema)]
pub struct CalculateResponse {
    pub subtotal: Decimal,
    pub shipping_charge: Decimal,
}

/// Handler for GET /api/shipping-tiers/calculate
/// Public shipping quote for the checkout page
#[utoipa::path(
    get,
    path = "/api/shipping-tiers/calculate",
    params(
        ("subtotal" = Decimal, Query, description = "Pre-tax cart subtotal")
    ),
    responses(
        (status = 200, description = "Resolved shipping charge", body = CalculateResponse),
        (status = 400, description = "Negative subtotal")
    ),
    tag = "shipping"
)]
pub async fn calculate_shipping_handler(
    State(state): State<AppState>,
    Query(query): Query<CalculateQuery>,
) -> Result<Json<CalculateResponse>, ShippingConfigError> {
    if query.subtotal < Decimal::ZERO {
        return Err(ShippingConfigError::NegativeMinAmount);
    }

    let tiers = state.shipping_service.repository().find_active().await?;
    let shipping_charge = resolve_shipping(query.subtotal, &tiers);

    Ok(Json(CalculateResponse {
        subtotal: query.subtotal,
        shipping_charge,
    }))
}

/// Handler for GET /api/shipping-tiers
/// Active tiers for display on the storefront
pub async fn get_active_tiers_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShippingTier>>, ShippingConfigError> {
    let tiers = state.shipping_service.repository().find_active().await?;
    Ok(Json(tiers))
}

/// Handler for GET /api/admin/shipping-tiers
pub async fn admin_list_tiers_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<ShippingTier>>, ShippingConfigError> {
    let tiers = state.shipping_service.repository().find_all().await?;
    Ok(Json(tiers))
}

/// Handler for POST /api/admin/shipping-tiers
pub async fn admin_create_tier_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateTierRequest>,
) -> Result<(StatusCode, Json<ShippingTier>), ShippingConfigError> {
    let tier = state.shipping_service.create_tier(request).await?;
    Ok((StatusCode::CREATED, Json(tier)))
}

/// Handler for PUT /api/admin/shipping-tiers/{tier_id}
pub async fn admin_update_tier_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(tier_id): Path<Uuid>,
    Json(request): Json<UpdateTierRequest>,
) -> Result<Json<ShippingTier>, ShippingConfigError> {
    let tier = state.shipping_service.update_tier(tier_id, request).await?;
    Ok(Json(tier))
}

/// Handler for PUT /api/admin/shipping-tiers/{tier_id}/toggle
pub async fn admin_toggle_tier_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(tier_id): Path<Uuid>,
) -> Result<Json<ShippingTier>, ShippingConfigError> {
    let tier = state.shipping_service.toggle_tier(tier_id).await?;
    Ok(Json(tier))
}

/// Handler for DELETE /api/admin/shipping-tiers/{tier_id}
pub async fn admin_delete_tier_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(tier_id): Path<Uuid>,
) -> Result<StatusCode, ShippingConfigError> {
    state.shipping_service.delete_tier(tier_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
