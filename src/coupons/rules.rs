use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::coupons::error::CouponError;
use crate::coupons::models::{Coupon, CouponType};

/// Round a derived monetary amount half-up to the minor currency unit
/// (paise). Applied once per derived amount, never iteratively.
pub fn round_to_paise(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Eligibility and discount computation for one coupon against one order
/// total. Checks run in a fixed order and short-circuit on the first
/// failure. Never touches `used_count`; consumption happens only in the
/// order-commit transaction.
pub fn check_coupon(
    coupon: &Coupon,
    order_total: Decimal,
    already_redeemed_by_user: bool,
    now: DateTime<Utc>,
) -> Result<Decimal, CouponError> {
    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }

    if let Some(expires_at) = coupon.expires_at {
        if now > expires_at {
            return Err(CouponError::Expired);
        }
    }

    if order_total < coupon.min_order_value {
        return Err(CouponError::BelowMinimum(coupon.min_order_value));
    }

    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CouponError::UsageLimitReached);
        }
    }

    if coupon.one_time_per_user && already_redeemed_by_user {
        return Err(CouponError::AlreadyUsedByUser);
    }

    Ok(discount_amount(coupon, order_total))
}

/// Discount for an eligible coupon, clamped so the payable total can never
/// go negative.
fn discount_amount(coupon: &Coupon, order_total: Decimal) -> Decimal {
    let raw = match coupon.coupon_type {
        CouponType::Percentage => {
            let mut discount =
                round_to_paise(order_total * coupon.discount_value / Decimal::from(100));
            if let Some(cap) = coupon.max_discount {
                discount = discount.min(cap);
            }
            discount
        }
        CouponType::Fixed => coupon.discount_value,
    };

    raw.min(order_total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn coupon(coupon_type: CouponType, value: Decimal) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SAVE10".to_string(),
            coupon_type,
            discount_value: value,
            min_order_value: Decimal::ZERO,
            max_discount: None,
            usage_limit: None,
            used_count: 0,
            one_time_per_user: true,
            auto_apply: false,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_discount() {
        let c = coupon(CouponType::Percentage, dec!(10));
        let discount = check_coupon(&c, dec!(1416.00), false, Utc::now()).unwrap();
        assert_eq!(discount, dec!(141.60));
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        let c = coupon(CouponType::Percentage, dec!(15));
        // 333.33 * 0.15 = 49.9995 -> 50.00
        let discount = check_coupon(&c, dec!(333.33), false, Utc::now()).unwrap();
        assert_eq!(discount, dec!(50.00));
    }

    #[test]
    fn test_percentage_capped_by_max_discount() {
        let mut c = coupon(CouponType::Percentage, dec!(50));
        c.max_discount = Some(dec!(200));
        let discount = check_coupon(&c, dec!(1000), false, Utc::now()).unwrap();
        assert_eq!(discount, dec!(200));
    }

    #[test]
    fn test_fixed_discount_clamped_to_order_total() {
        let c = coupon(CouponType::Fixed, dec!(500));
        let discount = check_coupon(&c, dec!(300), false, Utc::now()).unwrap();
        assert_eq!(discount, dec!(300));
    }

    #[test]
    fn test_inactive_fails() {
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.is_active = false;
        assert_eq!(
            check_coupon(&c, dec!(1000), false, Utc::now()),
            Err(CouponError::Inactive)
        );
    }

    #[test]
    fn test_expired_fails() {
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.expires_at = Some(Utc::now() - Duration::hours(1));
        assert_eq!(
            check_coupon(&c, dec!(1000), false, Utc::now()),
            Err(CouponError::Expired)
        );
    }

    #[test]
    fn test_not_yet_expired_passes() {
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(check_coupon(&c, dec!(1000), false, Utc::now()).is_ok());
    }

    #[test]
    fn test_below_minimum_fails() {
        // FLAT200 with min order 1000 applied to a total of 800
        let mut c = coupon(CouponType::Fixed, dec!(200));
        c.code = "FLAT200".to_string();
        c.min_order_value = dec!(1000);
        assert_eq!(
            check_coupon(&c, dec!(800), false, Utc::now()),
            Err(CouponError::BelowMinimum(dec!(1000)))
        );
    }

    #[test]
    fn test_usage_limit_reached_fails() {
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.usage_limit = Some(5);
        c.used_count = 5;
        assert_eq!(
            check_coupon(&c, dec!(1000), false, Utc::now()),
            Err(CouponError::UsageLimitReached)
        );
    }

    #[test]
    fn test_one_time_per_user_fails_after_redemption() {
        let c = coupon(CouponType::Fixed, dec!(100));
        assert_eq!(
            check_coupon(&c, dec!(1000), true, Utc::now()),
            Err(CouponError::AlreadyUsedByUser)
        );
    }

    #[test]
    fn test_prior_redemption_ignored_when_multi_use() {
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.one_time_per_user = false;
        assert!(check_coupon(&c, dec!(1000), true, Utc::now()).is_ok());
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        // Inactive AND expired AND below minimum: inactive wins
        let mut c = coupon(CouponType::Fixed, dec!(100));
        c.is_active = false;
        c.expires_at = Some(Utc::now() - Duration::hours(1));
        c.min_order_value = dec!(5000);
        assert_eq!(
            check_coupon(&c, dec!(10), true, Utc::now()),
            Err(CouponError::Inactive)
        );

        // Expired AND below minimum: expired wins
        c.is_active = true;
        assert_eq!(
            check_coupon(&c, dec!(10), true, Utc::now()),
            Err(CouponError::Expired)
        );

        // Below minimum AND already used: below minimum wins
        c.expires_at = None;
        assert_eq!(
            check_coupon(&c, dec!(10), true, Utc::now()),
            Err(CouponError::BelowMinimum(dec!(5000)))
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Discount bound: 0 <= discount <= order_total for every valid
        /// coupon shape.
        #[test]
        fn prop_discount_bounded_by_order_total() {
            proptest!(|(
                total_paise in 0i64..=100_000_00,
                value_pct in 0u32..=100u32,
                cap_paise in proptest::option::of(0i64..=10_000_00),
            )| {
                let total = Decimal::new(total_paise, 2);
                let mut c = coupon(CouponType::Percentage, Decimal::from(value_pct));
                c.max_discount = cap_paise.map(|p| Decimal::new(p, 2));

                let discount = check_coupon(&c, total, false, Utc::now()).unwrap();
                prop_assert!(discount >= Decimal::ZERO);
                prop_assert!(discount <= total);
            });
        }

        /// Fixed coupons never discount more than the order total either.
        #[test]
        fn prop_fixed_discount_bounded() {
            proptest!(|(
                total_paise in 0i64..=100_000_00,
                value_paise in 0i64..=200_000_00,
            )| {
                let total = Decimal::new(total_paise, 2);
                let c = coupon(CouponType::Fixed, Decimal::new(value_paise, 2));

                let discount = check_coupon(&c, total, false, Utc::now()).unwrap();
                prop_assert!(discount >= Decimal::ZERO);
                prop_assert!(discount <= total);
            });
        }
    }
}
