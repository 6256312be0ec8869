pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("JWT expired")]
    Expired,
    #[error("Invalid JWT: {0}")]
    Invalid(String),
}

pub fn generate_jwt(security: &SecurityConfig, user_id: i64) -> Result<String, JwtError> {
    let secret = &security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(user_id, security.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry; expired tokens are reported separately from bad ones
pub fn validate_jwt(security: &SecurityConfig, token: &str) -> Result<Claims, JwtError> {
    let secret = &security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::for_tests("/tmp").security
    }

    #[test]
    fn round_trips_subject() {
        let security = security();
        let token = generate_jwt(&security, 42).unwrap();
        let claims = validate_jwt(&security, &token).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let security = security();
        let mut other = security.clone();
        other.jwt_secret = "another-secret".to_string();

        let token = generate_jwt(&other, 1).unwrap();
        assert!(matches!(validate_jwt(&security, &token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn distinguishes_expired_tokens() {
        let security = security();
        let now = Utc::now().timestamp();
        let claims = Claims { sub: 1, iat: now - 7200, exp: now - 3600 };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(security.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(validate_jwt(&security, &token), Err(JwtError::Expired)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(validate_jwt(&security(), "not-a-jwt"), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let mut security = security();
        security.jwt_secret.clear();
        assert!(matches!(generate_jwt(&security, 1), Err(JwtError::InvalidSecret)));
    }
}
