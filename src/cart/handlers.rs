// HTTP handlers for cart endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::cart::{AddToCartRequest, CartError, CartItem, CartSummary, UpdateQuantityRequest};
use crate::AppState;

/// Response for the cart badge count
#[derive(Debug, Serialize, ToSchema)]
pub struct CartCountResponse {
    pub count: i64,
}

/// Handler for GET /api/cart
/// The caller's cart with live product data and subtotal
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart contents", body = CartSummary),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn get_cart_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CartSummary>, CartError> {
    let summary = state.cart_service.summary(user.user_id).await?;
    Ok(Json(summary))
}

/// Handler for POST /api/cart
/// Adds a product; quantities merge when the size is already in the cart
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Item added", body = CartItem),
        (status = 400, description = "Size unavailable or insufficient stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "cart"
)]
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>), CartError> {
    let item = state.cart_service.add_item(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Handler for PUT /api/cart/{item_id}
pub async fn update_cart_item_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(item_id): Path<i32>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItem>, CartError> {
    let item = state
        .cart_service
        .update_quantity(user.user_id, item_id, request)
        .await?;
    Ok(Json(item))
}

/// Handler for DELETE /api/cart/{item_id}
pub async fn remove_cart_item_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(item_id): Path<i32>,
) -> Result<Json<serde_json::Value>, CartError> {
    state.cart_service.remove_item(user.user_id, item_id).await?;
    Ok(Json(json!({ "message": "Item removed" })))
}

/// Handler for DELETE /api/cart
pub async fn clear_cart_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, CartError> {
    let removed = state.cart_service.clear(user.user_id).await?;
    Ok(Json(json!({ "message": "Cart cleared", "removed": removed })))
}

/// Handler for GET /api/cart/count
pub async fn cart_count_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CartCountResponse>, CartError> {
    let count = state.cart_service.item_count(user.user_id).await?;
    Ok(Json(CartCountResponse { count }))
}
