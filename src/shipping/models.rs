use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Shipping tier: a subtotal range mapped to a fixed charge.
/// `min_amount` is inclusive; `max_amount` is an inclusive upper bound,
/// None meaning unbounded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ShippingTier {
    pub id: Uuid,
    pub min_amount: Decimal,
    pub max_amount: Option<Decimal>,
    pub shipping_charge: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShippingTier {
    /// Whether this tier's range covers the given subtotal
    pub fn matches(&self, subtotal: Decimal) -> bool {
        self.min_amount <= subtotal
            && match self.max_amount {
                Some(max) => subtotal <= max,
                None => true,
            }
    }

    /// Human-readable range, used in admin validation messages
    pub fn range_label(&self) -> String {
        match self.max_amount {
            Some(max) => format!("₹{} - ₹{}", self.min_amount, max),
            None => format!("₹{}+", self.min_amount),
        }
    }
}

/// Request DTO for creating a shipping tier
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTierRequest {
    pub min_amount: Decimal,
    pub max_amount: Option<Decimal>,
    pub shipping_charge: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Request DTO for updating a shipping tier (partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTierRequest {
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub shipping_charge: Option<Decimal>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
