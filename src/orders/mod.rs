// Orders
// The commit path is the only writer of coupon usage, stock decrements, and
// the frozen monetary snapshot. Everything runs in one transaction; a lost
// coupon slot or a failed stock reservation rolls the whole attempt back.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::OrderError;
pub use models::{
    DeliveryAddress, Order, OrderItem, OrderStatus, OrderWithItems, PaymentMethod, PaymentStatus,
    PlaceOrderRequest, UpdateStatusRequest, UpdateTrackingRequest,
};
pub use repository::OrderRepository;
pub use service::OrderService;
