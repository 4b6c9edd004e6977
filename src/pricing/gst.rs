use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::db::DbPool;

/// Store-wide GST rate. Single row, seeded at 18% by the migration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GstSettings {
    pub gst_percentage: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for updating the GST rate (admin)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGstRequest {
    pub gst_percentage: Decimal,
}

#[derive(Clone)]
pub struct GstSettingsRepository {
    pool: DbPool,
}

impl GstSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> Result<GstSettings, sqlx::Error> {
        sqlx::query_as::<_, GstSettings>(
            "SELECT gst_percentage, updated_at FROM gst_settings WHERE id = TRUE",
        )
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, gst_percentage: Decimal) -> Result<GstSettings, sqlx::Error> {
        sqlx::query_as::<_, GstSettings>(
            r#"
            UPDATE gst_settings
            SET gst_percentage = $1, updated_at = NOW()
            WHERE id = TRUE
            RETURNING gst_percentage, updated_at
            "#,
        )
        .bind(gst_percentage)
        .fetch_one(&self.pool)
        .await
    }
}
