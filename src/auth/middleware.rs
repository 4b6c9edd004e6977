// Authentication extractors for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::auth::{error::AuthError, token::Role, token::TokenService};

/// Authenticated user extractor for protected routes
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

fn authenticate(parts: &Parts) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

    let token_service = TokenService::new(jwt_secret);
    let claims = token_service.validate_access_token(token)?;

    debug!("Authenticated user {} ({:?})", claims.sub, claims.role);
    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts)
    }
}

/// Extractor that additionally requires the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts)?;
        if user.role != Role::Admin {
            return Err(AuthError::AdminRequired);
        }
        Ok(AdminUser(user))
    }
}
