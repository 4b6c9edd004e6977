use chrono::Utc;
use rust_decimal::Decimal;

use crate::coupons::{AppliedType, Coupon, CouponService};
use crate::pricing::aggregator::{compute_totals, CouponContext, PriceBreakdown, PricedLine};
use crate::pricing::error::PricingError;
use crate::pricing::gst::GstSettingsRepository;
use crate::shipping::ShippingTierRepository;

/// A fully assembled price quote: the breakdown plus the coupon that was
/// applied to it, if any.
#[derive(Debug, Clone)]
pub struct Quote {
    pub breakdown: PriceBreakdown,
    pub coupon: Option<QuotedCoupon>,
}

/// The coupon attached to a quote, carrying how it was selected so the
/// redemption record can distinguish manual entry from auto-apply.
#[derive(Debug, Clone)]
pub struct QuotedCoupon {
    pub coupon: Coupon,
    pub discount_amount: Decimal,
    pub applied_type: AppliedType,
}

/// Assembles quotes from the live GST rate, active shipping tiers, and
/// coupon rules. The checkout preview and the order commit both go through
/// `quote`, so the numbers a customer previews are the numbers that get
/// frozen onto the order. All monetary arithmetic, the coupon branch
/// included, lives in `compute_totals`; this service only selects the
/// coupon and gathers inputs.
#[derive(Clone)]
pub struct PricingService {
    gst_repo: GstSettingsRepository,
    shipping_repo: ShippingTierRepository,
    coupon_service: CouponService,
}

impl PricingService {
    pub fn new(
        gst_repo: GstSettingsRepository,
        shipping_repo: ShippingTierRepository,
        coupon_service: CouponService,
    ) -> Self {
        Self {
            gst_repo,
            shipping_repo,
            coupon_service,
        }
    }

    pub fn gst_repository(&self) -> &GstSettingsRepository {
        &self.gst_repo
    }

    /// Quote with coupon handling. An explicit code is validated strictly
    /// and any failure propagates; with no code, the best eligible
    /// auto-apply coupon is attached, or none.
    pub async fn quote(
        &self,
        lines: &[PricedLine],
        user_id: i32,
        coupon_code: Option<&str>,
    ) -> Result<Quote, PricingError> {
        let gst = self.gst_repo.get().await?;
        let tiers = self.shipping_repo.find_active().await?;
        let now = Utc::now();

        let base = compute_totals(lines, gst.gst_percentage, &tiers, None, now)?;

        let selected = match coupon_code {
            Some(code) => {
                let validated = self
                    .coupon_service
                    .validate(code, base.pre_discount_total(), user_id)
                    .await?;
                Some((validated.coupon, AppliedType::Manual))
            }
            None => self
                .coupon_service
                .best_auto_coupon(base.pre_discount_total(), user_id)
                .await?
                .map(|validated| (validated.coupon, AppliedType::Auto)),
        };

        let Some((coupon, applied_type)) = selected else {
            return Ok(Quote {
                breakdown: base,
                coupon: None,
            });
        };

        // validate / best_auto_coupon already cleared the per-user
        // redemption check; a prior redemption would have errored there
        let ctx = CouponContext {
            coupon: &coupon,
            already_redeemed_by_user: false,
        };
        let breakdown = compute_totals(lines, gst.gst_percentage, &tiers, Some(ctx), now)?;
        let discount_amount = breakdown.discount_amount;

        Ok(Quote {
            breakdown,
            coupon: Some(QuotedCoupon {
                coupon,
                discount_amount,
                applied_type,
            }),
        })
    }

    /// Quote with no coupon at all, skipping auto-apply. Used as the
    /// fallback when a preview's coupon code is rejected.
    pub async fn quote_without_coupon(
        &self,
        lines: &[PricedLine],
    ) -> Result<Quote, PricingError> {
        let gst = self.gst_repo.get().await?;
        let tiers = self.shipping_repo.find_active().await?;
        let breakdown = compute_totals(lines, gst.gst_percentage, &tiers, None, Utc::now())?;

        Ok(Quote {
            breakdown,
            coupon: None,
        })
    }
}
