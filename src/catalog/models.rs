use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Catalog product. Prices are in rupees with paise precision.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Linen Oversized Shirt")]
    pub title: String,
    pub regular_price: Decimal,
    /// Sale price; when set it is the effective unit price
    pub discounted_price: Option<Decimal>,
    #[schema(example = json!(["S", "M", "L"]))]
    pub sizes: Vec<String>,
    #[schema(example = 24)]
    pub stock: i32,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a customer actually pays for one unit
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.regular_price)
    }
}
