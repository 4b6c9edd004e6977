// Discount coupon system
// Eligibility and discount computation are pure (`rules`); persistence and
// the atomic usage-count consume live in the repository. Usage is consumed
// only inside the order-commit transaction, never at validation/preview.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod rules;
pub mod service;

pub use error::CouponError;
pub use models::{
    AppliedType, Coupon, CouponRedemption, CouponType, CouponValidation, CouponWithStats,
    CreateCouponRequest, UpdateCouponRequest, ValidateCouponRequest,
};
pub use repository::CouponRepository;
pub use rules::{check_coupon, round_to_paise};
pub use service::{CouponService, ValidatedCoupon};
