// JWT validation for tokens issued by the identity service

use crate::auth::error::AuthError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// User role carried in token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// JWT claims structure shared with the identity service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub role: Role,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Token service for JWT validation
pub struct TokenService {
    secret: String,
}

impl TokenService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn issue(secret: &str, role: Role, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            email: "shopper@example.com".to_string(),
            role,
            iat: now,
            exp: now + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_round_trip() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("test-secret", Role::User, 900);

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("test-secret", Role::User, -900);

        match service.validate_access_token(&token) {
            Err(AuthError::ExpiredToken) => {}
            other => panic!("expected ExpiredToken, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = TokenService::new("test-secret".to_string());
        let token = issue("other-secret", Role::Admin, 900);

        match service.validate_access_token(&token) {
            Err(AuthError::InvalidToken) => {}
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }
}
