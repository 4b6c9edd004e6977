use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::coupons::error::CouponError;
use crate::coupons::models::{
    Coupon, CouponRedemption, CouponType, CreateCouponRequest, UpdateCouponRequest,
};
use crate::coupons::repository::CouponRepository;
use crate::coupons::rules::check_coupon;

/// Service for coupon validation, auto-apply selection, and administration
#[derive(Clone)]
pub struct CouponService {
    repo: CouponRepository,
}

/// A coupon that passed validation, together with its discount against the
/// order total it was validated for.
#[derive(Debug, Clone)]
pub struct ValidatedCoupon {
    pub coupon: Coupon,
    pub discount_amount: Decimal,
}

impl CouponService {
    pub fn new(repo: CouponRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &CouponRepository {
        &self.repo
    }

    /// Validate a coupon code against an order total for a user. Read-only:
    /// a successful validation does not consume a usage slot.
    pub async fn validate(
        &self,
        code: &str,
        order_total: Decimal,
        user_id: i32,
    ) -> Result<ValidatedCoupon, CouponError> {
        let code = code.trim().to_uppercase();
        let coupon = self
            .repo
            .find_by_code(&code)
            .await?
            .ok_or(CouponError::NotFound)?;

        let already_redeemed = if coupon.one_time_per_user {
            self.repo.redemption_exists(coupon.id, user_id).await?
        } else {
            false
        };

        let discount_amount = check_coupon(&coupon, order_total, already_redeemed, Utc::now())?;

        Ok(ValidatedCoupon {
            coupon,
            discount_amount,
        })
    }

    /// Pick the best auto-apply coupon for the given order total, or None
    /// when no candidate is eligible. Candidates are scanned oldest-first,
    /// so on a discount tie the earliest-created coupon wins. Every
    /// eligibility rule applies in auto mode, including the per-user
    /// one-time check.
    pub async fn best_auto_coupon(
        &self,
        order_total: Decimal,
        user_id: i32,
    ) -> Result<Option<ValidatedCoupon>, CouponError> {
        let candidates = self.repo.find_auto_apply_candidates().await?;
        let now = Utc::now();

        let mut best: Option<ValidatedCoupon> = None;
        for coupon in candidates {
            let already_redeemed = if coupon.one_time_per_user {
                self.repo.redemption_exists(coupon.id, user_id).await?
            } else {
                false
            };

            let discount = match check_coupon(&coupon, order_total, already_redeemed, now) {
                Ok(discount) => discount,
                Err(reason) => {
                    tracing::debug!("Auto-apply candidate {} skipped: {}", coupon.code, reason);
                    continue;
                }
            };

            let beats_current = match &best {
                Some(current) => discount > current.discount_amount,
                None => true,
            };
            if beats_current {
                best = Some(ValidatedCoupon {
                    coupon,
                    discount_amount: discount,
                });
            }
        }

        Ok(best)
    }

    pub async fn create_coupon(
        &self,
        request: CreateCouponRequest,
    ) -> Result<Coupon, CouponError> {
        let code = request.code.trim().to_uppercase();

        validate_discount_value(request.coupon_type, request.discount_value)?;

        if self.repo.code_exists(&code, None).await? {
            return Err(CouponError::CodeConflict(code));
        }

        let coupon = Coupon {
            id: Uuid::new_v4(),
            code,
            coupon_type: request.coupon_type,
            discount_value: request.discount_value,
            min_order_value: request.min_order_value,
            max_discount: request.max_discount,
            usage_limit: request.usage_limit,
            used_count: 0,
            one_time_per_user: request.one_time_per_user,
            auto_apply: request.auto_apply,
            is_active: request.is_active,
            expires_at: request.expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let created = self.repo.insert(&coupon).await?;
        tracing::info!("Created coupon {}", created.code);
        Ok(created)
    }

    pub async fn update_coupon(
        &self,
        id: Uuid,
        request: UpdateCouponRequest,
    ) -> Result<Coupon, CouponError> {
        let mut coupon = self.repo.find_by_id(id).await?.ok_or(CouponError::NotFound)?;

        if let Some(coupon_type) = request.coupon_type {
            coupon.coupon_type = coupon_type;
        }
        if let Some(value) = request.discount_value {
            coupon.discount_value = value;
        }
        if let Some(min) = request.min_order_value {
            coupon.min_order_value = min;
        }
        if let Some(cap) = request.max_discount {
            coupon.max_discount = Some(cap);
        }
        if let Some(limit) = request.usage_limit {
            coupon.usage_limit = Some(limit);
        }
        if let Some(one_time) = request.one_time_per_user {
            coupon.one_time_per_user = one_time;
        }
        if let Some(auto) = request.auto_apply {
            coupon.auto_apply = auto;
        }
        if let Some(active) = request.is_active {
            coupon.is_active = active;
        }
        if let Some(expires_at) = request.expires_at {
            coupon.expires_at = Some(expires_at);
        }

        validate_discount_value(coupon.coupon_type, coupon.discount_value)?;

        self.repo.update(&coupon).await
    }

    pub async fn toggle_coupon(&self, id: Uuid) -> Result<Coupon, CouponError> {
        let mut coupon = self.repo.find_by_id(id).await?.ok_or(CouponError::NotFound)?;
        coupon.is_active = !coupon.is_active;
        self.repo.update(&coupon).await
    }

    pub async fn delete_coupon(&self, id: Uuid) -> Result<(), CouponError> {
        self.repo.delete(id).await?;
        tracing::info!("Deleted coupon {}", id);
        Ok(())
    }

    pub async fn coupon_details(
        &self,
        id: Uuid,
    ) -> Result<(Coupon, Vec<CouponRedemption>), CouponError> {
        let coupon = self.repo.find_by_id(id).await?.ok_or(CouponError::NotFound)?;
        let history = self.repo.redemption_history(id).await?;
        Ok((coupon, history))
    }
}

fn validate_discount_value(
    coupon_type: CouponType,
    value: Decimal,
) -> Result<(), CouponError> {
    if value < Decimal::ZERO {
        return Err(CouponError::InvalidRule(
            "Discount value cannot be negative".to_string(),
        ));
    }
    if coupon_type == CouponType::Percentage && value > Decimal::from(100) {
        return Err(CouponError::InvalidRule(
            "Percentage discount must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}
