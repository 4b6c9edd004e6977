use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::coupons::{check_coupon, round_to_paise, Coupon, CouponError};
use crate::shipping::{resolve_shipping, ShippingTier};

/// One priced order line: effective unit price times quantity
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricedLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Coupon input to the aggregator: the rule row plus the caller's prior
/// redemption state, resolved before pricing so the computation itself
/// stays pure.
#[derive(Debug, Clone)]
pub struct CouponContext<'a> {
    pub coupon: &'a Coupon,
    pub already_redeemed_by_user: bool,
}

/// The monetary breakdown of an order. One shape serves the checkout
/// preview and the persisted order snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
    pub shipping_charge: Decimal,
    pub coupon_code: Option<String>,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

impl PriceBreakdown {
    /// The total before the coupon discount
    pub fn pre_discount_total(&self) -> Decimal {
        self.subtotal + self.gst_amount + self.shipping_charge
    }
}

/// Compute the full price breakdown for a set of lines.
///
/// The evaluation order is fixed and must not be rearranged:
/// 1. subtotal = Σ(unit price × quantity)
/// 2. GST on the full pre-discount subtotal, rounded half-up to paise
/// 3. shipping resolved from the pre-discount, pre-tax subtotal
/// 4. pre-discount total = subtotal + GST + shipping
/// 5. coupon validated against the pre-discount total
/// 6. total = pre-discount total − discount, floored at zero
///
/// Deterministic: identical inputs (including `now`) produce identical
/// output, which is what keeps the checkout preview and the order commit
/// in exact agreement.
pub fn compute_totals(
    lines: &[PricedLine],
    gst_percentage: Decimal,
    tiers: &[ShippingTier],
    coupon: Option<CouponContext<'_>>,
    now: DateTime<Utc>,
) -> Result<PriceBreakdown, CouponError> {
    let subtotal: Decimal = lines.iter().map(PricedLine::line_total).sum();

    let gst_amount = round_to_paise(subtotal * gst_percentage / Decimal::from(100));
    let shipping_charge = resolve_shipping(subtotal, tiers);
    let pre_discount_total = subtotal + gst_amount + shipping_charge;

    let (coupon_code, discount_amount) = match coupon {
        Some(ctx) => {
            let discount = check_coupon(
                ctx.coupon,
                pre_discount_total,
                ctx.already_redeemed_by_user,
                now,
            )?;
            (Some(ctx.coupon.code.clone()), discount)
        }
        None => (None, Decimal::ZERO),
    };

    let total = (pre_discount_total - discount_amount).max(Decimal::ZERO);

    Ok(PriceBreakdown {
        subtotal,
        gst_amount,
        shipping_charge,
        coupon_code,
        discount_amount,
        total,
    })
}
