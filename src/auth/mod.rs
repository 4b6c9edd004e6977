// Authentication boundary module
// Token issuance lives in a separate identity service; this module only
// validates bearer tokens and exposes the extractors handlers depend on.

pub mod error;
pub mod middleware;
pub mod token;

pub use error::AuthError;
pub use middleware::{AdminUser, AuthenticatedUser};
pub use token::{Claims, Role, TokenService};
