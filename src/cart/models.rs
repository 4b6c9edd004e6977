use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// One cart row. A user holds at most one row per (product, size) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartItem {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub size: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart row joined with live product data for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CartItemDetail {
    pub id: i32,
    pub product_id: i32,
    pub title: String,
    pub size: String,
    pub quantity: i32,
    /// Current effective unit price; the frozen price is set at order commit
    pub unit_price: Decimal,
    pub image_url: String,
    pub stock: i32,
}

impl CartItemDetail {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Response for the cart listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummary {
    pub items: Vec<CartItemDetail>,
    pub item_count: i64,
    pub subtotal: Decimal,
}

/// Request DTO for adding a product to the cart
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: i32,
    #[validate(length(min = 1, message = "Size is required"))]
    pub size: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Request DTO for setting a cart item's quantity
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}
