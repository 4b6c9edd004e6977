// Product catalog collaborator
// The pricing engine treats this module as the sole source of truth for
// unit price and stock at commit time.

pub mod models;
pub mod repository;

pub use models::Product;
pub use repository::CatalogRepository;
