use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::coupons::error::CouponError;
use crate::coupons::models::{AppliedType, Coupon, CouponRedemption};

/// Repository for coupon and redemption persistence
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

const COUPON_COLUMNS: &str = "id, code, coupon_type, discount_value, min_order_value, \
     max_discount, usage_limit, used_count, one_time_per_user, auto_apply, \
     is_active, expires_at, created_at, updated_at";

impl CouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by (already uppercased) code
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CouponError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, CouponError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Active auto-apply candidates, oldest first so the earliest-created
    /// coupon wins discount ties.
    pub async fn find_auto_apply_candidates(&self) -> Result<Vec<Coupon>, CouponError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons \
             WHERE is_active = TRUE AND auto_apply = TRUE \
             ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    pub async fn find_all(&self, include_inactive: bool) -> Result<Vec<Coupon>, CouponError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons \
             WHERE is_active = TRUE OR $1 \
             ORDER BY created_at DESC"
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons)
    }

    /// Whether the user has redeemed the coupon before. Backs the
    /// one-time-per-user check.
    pub async fn redemption_exists(
        &self,
        coupon_id: Uuid,
        user_id: i32,
    ) -> Result<bool, CouponError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM coupon_redemptions WHERE coupon_id = $1 AND user_id = $2)",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }

    /// Atomically consume one usage slot within the caller's transaction.
    /// The conditional WHERE clause is the usage-limit race guard: two
    /// concurrent commits against the last slot cannot both succeed.
    /// Returns false when the limit was already reached.
    pub async fn try_consume(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon_id: Uuid,
    ) -> Result<bool, CouponError> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE id = $1 AND (usage_limit IS NULL OR used_count < usage_limit)
            "#,
        )
        .bind(coupon_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Record a redemption in the caller's transaction. Rows are immutable
    /// once written.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_redemption(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon_id: Uuid,
        code: &str,
        user_id: i32,
        order_id: Uuid,
        discount_amount: Decimal,
        order_subtotal: Decimal,
        applied_type: AppliedType,
    ) -> Result<(), CouponError> {
        sqlx::query(
            r#"
            INSERT INTO coupon_redemptions
                (coupon_id, code, user_id, order_id, discount_amount, order_subtotal, applied_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(coupon_id)
        .bind(code)
        .bind(user_id)
        .bind(order_id)
        .bind(discount_amount)
        .bind(order_subtotal)
        .bind(applied_type)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Redemption history for one coupon, newest first
    pub async fn redemption_history(
        &self,
        coupon_id: Uuid,
    ) -> Result<Vec<CouponRedemption>, CouponError> {
        let redemptions = sqlx::query_as::<_, CouponRedemption>(
            r#"
            SELECT id, coupon_id, code, user_id, order_id, discount_amount,
                   order_subtotal, applied_type, redeemed_at
            FROM coupon_redemptions
            WHERE coupon_id = $1
            ORDER BY redeemed_at DESC
            "#,
        )
        .bind(coupon_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(redemptions)
    }

    /// Aggregate redemption stats for the admin listing
    pub async fn redemption_stats(&self, coupon_id: Uuid) -> Result<(i64, Decimal), CouponError> {
        let row: (i64, Option<Decimal>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(discount_amount), 0)
            FROM coupon_redemptions
            WHERE coupon_id = $1
            "#,
        )
        .bind(coupon_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.0, row.1.unwrap_or(Decimal::ZERO)))
    }

    pub async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool, CouponError> {
        let exists: Option<bool> = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM coupons WHERE code = $1 AND ($2::uuid IS NULL OR id != $2))",
        )
        .bind(code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.unwrap_or(false))
    }

    pub async fn insert(&self, coupon: &Coupon) -> Result<Coupon, CouponError> {
        let created = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons \
                 (id, code, coupon_type, discount_value, min_order_value, max_discount, \
                  usage_limit, one_time_per_user, auto_apply, is_active, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(coupon.coupon_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_value)
        .bind(coupon.max_discount)
        .bind(coupon.usage_limit)
        .bind(coupon.one_time_per_user)
        .bind(coupon.auto_apply)
        .bind(coupon.is_active)
        .bind(coupon.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update(&self, coupon: &Coupon) -> Result<Coupon, CouponError> {
        let updated = sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons \
             SET coupon_type = $2, discount_value = $3, min_order_value = $4, \
                 max_discount = $5, usage_limit = $6, one_time_per_user = $7, \
                 auto_apply = $8, is_active = $9, expires_at = $10, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(coupon.id)
        .bind(coupon.coupon_type)
        .bind(coupon.discount_value)
        .bind(coupon.min_order_value)
        .bind(coupon.max_discount)
        .bind(coupon.usage_limit)
        .bind(coupon.one_time_per_user)
        .bind(coupon.auto_apply)
        .bind(coupon.is_active)
        .bind(coupon.expires_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CouponError::NotFound)?;

        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), CouponError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CouponError::NotFound);
        }

        Ok(())
    }
}
