// Order pricing engine
// Composes subtotal, GST, shipping, and coupon discount in one fixed
// evaluation order. The same code path produces the checkout preview and the
// committed order's monetary snapshot, so the two cannot diverge absent a
// state change between the calls.

pub mod aggregator;
pub mod error;
pub mod gst;
pub mod handlers;
pub mod service;

pub use aggregator::{compute_totals, CouponContext, PriceBreakdown, PricedLine};
pub use error::PricingError;
pub use gst::{GstSettings, GstSettingsRepository, UpdateGstRequest};
pub use service::{PricingService, Quote, QuotedCoupon};
