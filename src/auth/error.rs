// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::fmt;
use tracing::{debug, warn};

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    /// User lacks the admin role required for the operation
    AdminRequired,
    /// Configuration error in the auth system (e.g. missing JWT secret)
    ConfigError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::AdminRequired => write!(f, "Admin access required"),
            AuthError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::MissingToken => {
                debug!("Authentication failure: {}", self);
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::AdminRequired => {
                warn!("Authorization failure: {}", self);
                (StatusCode::FORBIDDEN, self.to_string())
            }
            AuthError::ConfigError(msg) => {
                warn!("Auth configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication unavailable".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
