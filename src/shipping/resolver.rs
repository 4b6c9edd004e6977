use rust_decimal::Decimal;

use crate::shipping::ShippingTier;

/// Legacy flat-rate behavior, used when no configured tier covers the
/// subtotal: free above this threshold, flat charge otherwise.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(999, 0, 0, false, 0);
pub const FLAT_SHIPPING_CHARGE: Decimal = Decimal::from_parts(99, 0, 0, false, 0);

/// Resolve the shipping charge for a pre-tax, pre-discount subtotal.
///
/// Active tiers match when `min_amount <= subtotal <= max_amount` (unbounded
/// when max is unset). Exactly one active tier should match; when several do
/// (a configuration error that slipped past admin-write validation) the tier
/// with the smallest `min_amount` wins, deterministically. When none match,
/// the legacy flat-rate fallback applies.
pub fn resolve_shipping(subtotal: Decimal, tiers: &[ShippingTier]) -> Decimal {
    let mut matches: Vec<&ShippingTier> = tiers
        .iter()
        .filter(|tier| tier.is_active && tier.matches(subtotal))
        .collect();

    if matches.len() > 1 {
        tracing::warn!(
            "{} shipping tiers match subtotal {}; resolving to smallest min_amount",
            matches.len(),
            subtotal
        );
        matches.sort_by(|a, b| a.min_amount.cmp(&b.min_amount));
    }

    match matches.first() {
        Some(tier) => tier.shipping_charge,
        None => {
            if subtotal > FREE_SHIPPING_THRESHOLD {
                Decimal::ZERO
            } else {
                FLAT_SHIPPING_CHARGE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn tier(min: Decimal, max: Option<Decimal>, charge: Decimal, active: bool) -> ShippingTier {
        ShippingTier {
            id: Uuid::new_v4(),
            min_amount: min,
            max_amount: max,
            shipping_charge: charge,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_matching_tier_charge_is_used() {
        let tiers = vec![
            tier(dec!(0), Some(dec!(498.99)), dec!(79), true),
            tier(dec!(499), Some(dec!(998.99)), dec!(49), true),
            tier(dec!(999), None, dec!(0), true),
        ];

        assert_eq!(resolve_shipping(dec!(250), &tiers), dec!(79));
        assert_eq!(resolve_shipping(dec!(500), &tiers), dec!(49));
        assert_eq!(resolve_shipping(dec!(2000), &tiers), dec!(0));
    }

    #[test]
    fn test_max_amount_is_inclusive() {
        let tiers = vec![
            tier(dec!(0), Some(dec!(499)), dec!(79), true),
            tier(dec!(499.01), None, dec!(0), true),
        ];

        assert_eq!(resolve_shipping(dec!(499), &tiers), dec!(79));
        assert_eq!(resolve_shipping(dec!(499.01), &tiers), dec!(0));
    }

    #[test]
    fn test_inactive_tiers_are_ignored() {
        let tiers = vec![tier(dec!(0), None, dec!(79), false)];

        // Inactive tier doesn't match, so the flat-rate fallback applies
        assert_eq!(resolve_shipping(dec!(500), &tiers), dec!(99));
    }

    #[test]
    fn test_fallback_when_no_tiers_configured() {
        assert_eq!(resolve_shipping(dec!(500), &[]), dec!(99));
        assert_eq!(resolve_shipping(dec!(999), &[]), dec!(99));
        assert_eq!(resolve_shipping(dec!(999.01), &[]), dec!(0));
        assert_eq!(resolve_shipping(dec!(1500), &[]), dec!(0));
    }

    #[test]
    fn test_fallback_in_uncovered_gap() {
        let tiers = vec![
            tier(dec!(0), Some(dec!(200)), dec!(79), true),
            tier(dec!(1200), None, dec!(0), true),
        ];

        // 600 falls in the gap between tiers; below the free threshold
        assert_eq!(resolve_shipping(dec!(600), &tiers), dec!(99));
        // 1100 also falls in the gap but is above the free threshold
        assert_eq!(resolve_shipping(dec!(1100), &tiers), dec!(0));
    }

    #[test]
    fn test_double_match_resolves_to_smallest_min() {
        // Overlapping config that should have been rejected at admin write
        let tiers = vec![
            tier(dec!(100), Some(dec!(800)), dec!(49), true),
            tier(dec!(0), Some(dec!(500)), dec!(79), true),
        ];

        assert_eq!(resolve_shipping(dec!(300), &tiers), dec!(79));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Tier coverage: every non-negative subtotal maps to exactly one
        /// charge, whether a tier matches or the fallback applies.
        #[test]
        fn prop_every_subtotal_resolves() {
            let tiers = vec![
                tier(dec!(0), Some(dec!(498.99)), dec!(79), true),
                tier(dec!(499), Some(dec!(998.99)), dec!(49), true),
                tier(dec!(999), None, dec!(0), true),
            ];

            proptest!(|(paise in 0u64..=10_000_000u64)| {
                let subtotal = Decimal::new(paise as i64, 2);
                let charge = resolve_shipping(subtotal, &tiers);
                prop_assert!(charge == dec!(79) || charge == dec!(49) || charge == dec!(0));

                // Resolution is a function of the subtotal alone
                prop_assert_eq!(charge, resolve_shipping(subtotal, &tiers));
            });
        }

        /// With no tiers, the fallback partitions subtotals at the free
        /// shipping threshold.
        #[test]
        fn prop_fallback_partition() {
            proptest!(|(paise in 0u64..=100_000_000u64)| {
                let subtotal = Decimal::new(paise as i64, 2);
                let charge = resolve_shipping(subtotal, &[]);
                if subtotal > FREE_SHIPPING_THRESHOLD {
                    prop_assert_eq!(charge, Decimal::ZERO);
                } else {
                    prop_assert_eq!(charge, FLAT_SHIPPING_CHARGE);
                }
            });
        }
    }
}
