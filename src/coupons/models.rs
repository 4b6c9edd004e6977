use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Discount kind. Closed set; discount computation matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    Percentage,
    Fixed,
}

impl std::fmt::Display for CouponType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouponType::Percentage => write!(f, "percentage"),
            CouponType::Fixed => write!(f, "fixed"),
        }
    }
}

/// How a redemption was applied: entered by the customer or chosen by the
/// auto-apply pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppliedType {
    Manual,
    Auto,
}

/// Coupon rule. Codes are stored uppercase; `used_count` grows monotonically
/// and is never decremented, including on order cancellation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    #[schema(example = "SAVE10")]
    pub code: String,
    pub coupon_type: CouponType,
    /// Percentage (0-100) or fixed amount depending on type
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    /// Cap for percentage discounts
    pub max_discount: Option<Decimal>,
    /// Total times the coupon can be redeemed; None = unlimited
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub one_time_per_user: bool,
    pub auto_apply: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable record of one coupon use by one user on one order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CouponRedemption {
    pub id: Uuid,
    pub coupon_id: Uuid,
    pub code: String,
    pub user_id: i32,
    pub order_id: Uuid,
    pub discount_amount: Decimal,
    pub order_subtotal: Decimal,
    pub applied_type: AppliedType,
    pub redeemed_at: DateTime<Utc>,
}

/// Request DTO for creating a coupon (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCouponRequest {
    #[validate(length(min = 1, max = 32, message = "Code must be 1-32 characters"))]
    pub code: String,
    pub coupon_type: CouponType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Decimal,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub one_time_per_user: bool,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request DTO for updating a coupon (admin, partial)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCouponRequest {
    pub coupon_type: Option<CouponType>,
    pub discount_value: Option<Decimal>,
    pub min_order_value: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub one_time_per_user: Option<bool>,
    pub auto_apply: Option<bool>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request DTO for validating a coupon at checkout preview
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateCouponRequest {
    #[validate(length(min = 1, message = "Coupon code is required"))]
    pub code: String,
    pub order_total: Decimal,
}

/// Response for a successful coupon validation
#[derive(Debug, Serialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub coupon_code: String,
    pub coupon_type: CouponType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
    pub original_total: Decimal,
    pub new_total: Decimal,
    pub message: String,
}

/// Admin listing entry: coupon enriched with redemption stats
#[derive(Debug, Serialize, ToSchema)]
pub struct CouponWithStats {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub redemption_count: i64,
    pub total_discount_given: Decimal,
    pub is_expired: bool,
}

fn default_true() -> bool {
    true
}
