use sqlx::PgPool;
use uuid::Uuid;

use crate::shipping::error::ShippingConfigError;
use crate::shipping::models::ShippingTier;

/// Repository for shipping tier persistence
#[derive(Clone)]
pub struct ShippingTierRepository {
    pool: PgPool,
}

impl ShippingTierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active tiers, ordered by range start. This is the snapshot the
    /// price aggregator resolves against.
    pub async fn find_active(&self) -> Result<Vec<ShippingTier>, ShippingConfigError> {
        let tiers = sqlx::query_as::<_, ShippingTier>(
            r#"
            SELECT id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            FROM shipping_tiers
            WHERE is_active = TRUE
            ORDER BY min_amount
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tiers)
    }

    /// All tiers including inactive, for the admin listing
    pub async fn find_all(&self) -> Result<Vec<ShippingTier>, ShippingConfigError> {
        let tiers = sqlx::query_as::<_, ShippingTier>(
            r#"
            SELECT id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            FROM shipping_tiers
            ORDER BY min_amount
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tiers)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ShippingTier>, ShippingConfigError> {
        let tier = sqlx::query_as::<_, ShippingTier>(
            r#"
            SELECT id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            FROM shipping_tiers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tier)
    }

    /// Active tiers other than the given one, for overlap validation when
    /// editing an existing tier.
    pub async fn find_active_excluding(
        &self,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<ShippingTier>, ShippingConfigError> {
        let tiers = sqlx::query_as::<_, ShippingTier>(
            r#"
            SELECT id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            FROM shipping_tiers
            WHERE is_active = TRUE AND ($1::uuid IS NULL OR id != $1)
            ORDER BY min_amount
            "#,
        )
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tiers)
    }

    pub async fn insert(&self, tier: &ShippingTier) -> Result<ShippingTier, ShippingConfigError> {
        let created = sqlx::query_as::<_, ShippingTier>(
            r#"
            INSERT INTO shipping_tiers (id, min_amount, max_amount, shipping_charge, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            "#,
        )
        .bind(tier.id)
        .bind(tier.min_amount)
        .bind(tier.max_amount)
        .bind(tier.shipping_charge)
        .bind(tier.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update(&self, tier: &ShippingTier) -> Result<ShippingTier, ShippingConfigError> {
        let updated = sqlx::query_as::<_, ShippingTier>(
            r#"
            UPDATE shipping_tiers
            SET min_amount = $2, max_amount = $3, shipping_charge = $4, is_active = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, min_amount, max_amount, shipping_charge, is_active, created_at, updated_at
            "#,
        )
        .bind(tier.id)
        .bind(tier.min_amount)
        .bind(tier.max_amount)
        .bind(tier.shipping_charge)
        .bind(tier.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ShippingConfigError::NotFound)?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ShippingConfigError> {
        let result = sqlx::query("DELETE FROM shipping_tiers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ShippingConfigError::NotFound);
        }

        Ok(())
    }
}
