// Shopping cart
// Per-user cart lines keyed on (user, product, size). Quantities merge on
// re-add; the checkout preview and order commit price the cart through
// `CartService::priced_lines`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::CartError;
pub use models::{AddToCartRequest, CartItem, CartItemDetail, CartSummary, UpdateQuantityRequest};
pub use repository::CartRepository;
pub use service::CartService;
