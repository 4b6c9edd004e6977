// Tier-based shipping calculation
// Shipping is resolved from the pre-tax, pre-discount subtotal against
// admin-configured non-overlapping amount ranges.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod service;

pub use error::ShippingConfigError;
pub use models::{CreateTierRequest, ShippingTier, UpdateTierRequest};
pub use repository::ShippingTierRepository;
pub use resolver::{resolve_shipping, FLAT_SHIPPING_CHARGE, FREE_SHIPPING_THRESHOLD};
pub use service::ShippingService;
