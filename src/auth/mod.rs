use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Platform-wide role carried in the token. Elevated alone never grants restaurant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Ordinary,
    Elevated,
}

/// Authenticated actor, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub global_role: GlobalRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: GlobalRole,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Fails when `expiry_hours` puts `exp` outside the representable time range.
    pub fn new(principal_id: Uuid, role: GlobalRole, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(JwtError::ExpiryOutOfRange(expiry_hours))?;

        Ok(Self {
            sub: principal_id,
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            global_role: claims.role,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT expiry of {0} hours is out of range")]
    ExpiryOutOfRange(u64),
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Issue a token for `principal_id` using the configured expiry
pub fn issue_token(
    principal_id: Uuid,
    role: GlobalRole,
    security: &SecurityConfig,
) -> Result<String, JwtError> {
    let claims = Claims::new(principal_id, role, security.jwt_expiry_hours)?;
    generate_jwt(&claims, security)
}

/// Validate JWT token and extract claims
pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str) -> SecurityConfig {
        SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_hours: 1,
            enable_cors: false,
            cors_origins: vec![],
        }
    }

    #[test]
    fn issued_token_validates() {
        let id = Uuid::new_v4();
        let token = issue_token(id, GlobalRole::Elevated, &security("s3cret")).unwrap();
        let principal: Principal = validate_jwt(&token, &security("s3cret")).unwrap().into();
        assert_eq!(
            principal,
            Principal {
                id,
                global_role: GlobalRole::Elevated,
            }
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), GlobalRole::Ordinary, &security("one")).unwrap();
        assert!(matches!(
            validate_jwt(&token, &security("two")),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(matches!(
            issue_token(Uuid::new_v4(), GlobalRole::Ordinary, &security("")),
            Err(JwtError::InvalidSecret)
        ));
    }

    #[test]
    fn oversized_expiry_is_an_error() {
        let id = Uuid::new_v4();
        for hours in [u64::MAX, i64::MAX as u64, 1 << 40] {
            assert!(matches!(
                Claims::new(id, GlobalRole::Ordinary, hours),
                Err(JwtError::ExpiryOutOfRange(h)) if h == hours
            ));
        }

        let mut config = security("s3cret");
        config.jwt_expiry_hours = u64::MAX;
        assert!(matches!(
            issue_token(id, GlobalRole::Ordinary, &config),
            Err(JwtError::ExpiryOutOfRange(_))
        ));
    }

    #[test]
    fn expiry_is_counted_in_hours() {
        let claims = Claims::new(Uuid::new_v4(), GlobalRole::Ordinary, 24).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }
}
