use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Allowed forward transitions. Delivered and Cancelled are terminal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Razorpay,
    Cod,
}

/// Shipping destination, stored as JSONB on the order
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DeliveryAddress {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 10, message = "Phone number is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Address line is required"))]
    pub address_line: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 6, max = 6, message = "Pincode must be 6 digits"))]
    pub pincode: String,
}

/// An order with its frozen monetary snapshot. The breakdown columns are
/// written once at commit and never recomputed from live prices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: i32,
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub shipping_charge: Decimal,
    pub coupon_code: Option<String>,
    pub coupon_discount: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub tracking_id: Option<String>,
    pub courier: Option<String>,
    pub delivery_address: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order, with title and unit price frozen at commit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Uuid,
    pub product_id: i32,
    pub product_title: String,
    pub size: String,
    pub quantity: i32,
    pub price_snapshot: Decimal,
    pub subtotal: Decimal,
}

/// Order detail response
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Request DTO for placing an order from the current cart
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    #[validate]
    pub delivery_address: DeliveryAddress,
    /// Coupon code; when absent the best auto-apply coupon is used
    pub coupon_code: Option<String>,
}

/// Request DTO for the admin status update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub order_status: OrderStatus,
}

/// Request DTO for attaching tracking details; implies Shipped
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTrackingRequest {
    #[validate(length(min = 1, message = "Tracking ID is required"))]
    pub tracking_id: String,
    #[validate(length(min = 1, message = "Courier is required"))]
    pub courier: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_cancellation_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_frozen() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }
}
