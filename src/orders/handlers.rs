// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthenticatedUser, Role};
use crate::orders::{
    Order, OrderError, OrderStatus, OrderWithItems, PlaceOrderRequest, UpdateStatusRequest,
    UpdateTrackingRequest,
};
use crate::AppState;

/// Query parameters for the admin order listing
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

/// Request DTO for the payment callback
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentCallbackRequest {
    pub success: bool,
}

/// Handler for POST /api/orders
/// Commits the caller's cart as an order
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderWithItems),
        (status = 400, description = "Empty cart or rejected coupon"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Out of stock or coupon usage exhausted")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn place_order_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>), OrderError> {
    let order = state.order_service.place_order(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET /api/orders
/// The caller's order history, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order history", body = [Order]),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn my_orders_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = state.order_service.my_orders(user.user_id).await?;
    Ok(Json(orders))
}

/// Handler for GET /api/orders/{order_id}
pub async fn order_detail_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, OrderError> {
    let is_admin = user.role == Role::Admin;
    let detail = state
        .order_service
        .order_detail(order_id, user.user_id, is_admin)
        .await?;
    Ok(Json(detail))
}

/// Handler for POST /api/orders/{order_id}/payment
/// Payment gateway callback for the order's payment outcome
pub async fn payment_callback_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<PaymentCallbackRequest>,
) -> Result<Json<Order>, OrderError> {
    // Owner check before recording the outcome
    state
        .order_service
        .order_detail(order_id, user.user_id, false)
        .await?;

    let order = state
        .order_service
        .record_payment(order_id, request.success)
        .await?;
    Ok(Json(order))
}

/// Handler for GET /api/admin/orders
pub async fn admin_list_orders_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = state
        .order_service
        .all_orders(query.status, query.limit)
        .await?;
    Ok(Json(orders))
}

/// Handler for GET /api/admin/orders/{order_id}
pub async fn admin_order_detail_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, OrderError> {
    let detail = state.order_service.order_detail(order_id, 0, true).await?;
    Ok(Json(detail))
}

/// Handler for PUT /api/admin/orders/{order_id}/status
pub async fn admin_update_status_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, OrderError> {
    let order = state.order_service.update_status(order_id, request).await?;
    Ok(Json(order))
}

/// Handler for PUT /api/admin/orders/{order_id}/tracking
/// Attaches tracking details and marks the order shipped
pub async fn admin_update_tracking_handler(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateTrackingRequest>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .update_tracking(order_id, request)
        .await?;
    Ok(Json(order))
}
