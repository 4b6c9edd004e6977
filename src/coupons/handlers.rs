// HTTP handlers for coupon endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::coupons::error::CouponError;
use crate::coupons::models::{
    Coupon, CouponRedemption, CouponValidation, CouponWithStats, CreateCouponRequest,
    UpdateCouponRequest, ValidateCouponRequest,
};
use crate::AppState;

/// Query parameters for the auto-apply lookup
#[derive(Debug, Deserialize)]
pub struct AutoApplyQuery {
    pub subtotal: Decimal,
}

/// Response for the auto-apply lookup; `coupon` is None when no auto-apply
/// coupon is eligible for this user and subtotal.
#[derive(Debug, Serialize, ToSchema)]
pub struct AutoApplyResponse {
    pub coupon: Option<Coupon>,
    pub discount_amount: Decimal,
}

/// Query parameters for the admin coupon listing
#[derive(Debug, Deserialize)]
pub struct ListCouponsQuery {
    #[serde(default = "default_true")]
    pub include_inactive: bool,
}

fn default_true() -> bool {
    true
}

/// Admin detail response: coupon plus full redemption history
#[derive(Debug, Serialize, ToSchema)]
pub struct CouponDetailResponse {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub total_discount_given: Decimal,
    pub usage_history: Vec<CouponRedemption>,
}

/// Handler for POST /api/coupons/validate
/// Validates a code against the caller's order total without consuming it
#[utoipa::path(
    post,
    path = "/api/coupons/validate",
    request_body = ValidateCouponRequest,
    responses(
        (status = 200, description = "Coupon is valid", body = CouponValidation),
        (status = 400, description = "Coupon not eligible for this order"),
        (status = 404, description = "Unknown coupon code")
    ),
    tag = "coupons"
)]
pub async fn validate_coupon_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<CouponValidation>, CouponError> {
    request
        .validate()
        .map_err(|e| CouponError::InvalidRule(e.to_string()))?;

    let validated = state
        .coupon_service
        .validate(&request.code, request.order_total, user.user_id)
        .await?;

    let new_total = request.order_total - validated.discount_amount;
    Ok(Json(CouponValidation {
        valid: true,
        coupon_code: validated.coupon.code.clone(),
        coupon_type: validated.coupon.coupon_type,
        discount_value: validated.coupon.discount_value,
        discount_amount: validated.discount_amount,
        original_total: request.order_total,
        new_total,
        message: format!("Coupon applied! You save ₹{}", validated.discount_amount),
    }))
}

/// Handler for GET /api/coupons/auto-apply
/// Best eligible auto-apply coupon for the given subtotal
#[utoipa::path(
    get,
    path = "/api/coupons/auto-apply",
    params(
        ("subtotal" = Decimal, Query, description = "Order total to qualify against")
    ),
    responses(
        (status = 200, description = "Best eligible auto-apply coupon, if any", body = AutoApplyResponse),
        (status = 400, description = "Negative subtotal")
    ),
    tag = "coupons"
)]
pub async fn auto_apply_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<AutoApplyQuery>,
) -> Result<Json<AutoApplyResponse>, CouponError> {
    if query.subtotal < Decimal::ZERO {
        return Err(CouponError::InvalidRule(
            "Subtotal cannot be negative".to_string(),
        ));
    }

    let best = state
        .coupon_service
        .best_auto_coupon(query.subtotal, user.user_id)
        .await?;

    let response = match best {
        Some(validated) => AutoApplyResponse {
            discount_amount: validated.discount_amount,
            coupon: Some(validated.coupon),
        },
        None => AutoApplyResponse {
            coupon: None,
            discount_amount: Decimal::ZERO,
        },
    };

    Ok(Json(response))
}

/// Handler for POST /api/admin/coupons
pub async fn admin_create_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), CouponError> {
    request
        .validate()
        .map_err(|e| CouponError::InvalidRule(e.to_string()))?;

    let coupon = state.coupon_service.create_coupon(request).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Handler for GET /api/admin/coupons
/// All coupons enriched with redemption stats
pub async fn admin_list_coupons_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListCouponsQuery>,
) -> Result<Json<Vec<CouponWithStats>>, CouponError> {
    let coupons = state
        .coupon_service
        .repository()
        .find_all(query.include_inactive)
        .await?;

    let now = Utc::now();
    let mut enriched = Vec::with_capacity(coupons.len());
    for coupon in coupons {
        let (redemption_count, total_discount_given) = state
            .coupon_service
            .repository()
            .redemption_stats(coupon.id)
            .await?;

        let is_expired = coupon.expires_at.is_some_and(|at| now > at);
        enriched.push(CouponWithStats {
            coupon,
            redemption_count,
            total_discount_given,
            is_expired,
        });
    }

    Ok(Json(enriched))
}

/// Handler for GET /api/admin/coupons/{coupon_id}
pub async fn admin_coupon_details_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<CouponDetailResponse>, CouponError> {
    let (coupon, usage_history) = state.coupon_service.coupon_details(coupon_id).await?;

    let total_discount_given = usage_history
        .iter()
        .map(|redemption| redemption.discount_amount)
        .sum();

    Ok(Json(CouponDetailResponse {
        coupon,
        total_discount_given,
        usage_history,
    }))
}

/// Handler for PUT /api/admin/coupons/{coupon_id}
pub async fn admin_update_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
    Json(request): Json<UpdateCouponRequest>,
) -> Result<Json<Coupon>, CouponError> {
    let coupon = state
        .coupon_service
        .update_coupon(coupon_id, request)
        .await?;
    Ok(Json(coupon))
}

/// Handler for PUT /api/admin/coupons/{coupon_id}/toggle
pub async fn admin_toggle_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<Coupon>, CouponError> {
    let coupon = state.coupon_service.toggle_coupon(coupon_id).await?;
    Ok(Json(coupon))
}

/// Handler for DELETE /api/admin/coupons/{coupon_id}
pub async fn admin_delete_coupon_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<StatusCode, CouponError> {
    state.coupon_service.delete_coupon(coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
