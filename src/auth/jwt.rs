//! JWT token generation and validation
//!
//! Session tokens are HS256 JWTs. Expiry is checked here rather than by
//! `jsonwebtoken` so callers can verify against an explicit instant.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthType, User};

/// Default session lifetime: 24 hours
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// JWT-related errors
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token decoding failed: {0}")]
    DecodingFailed(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub auth_type: AuthType,
    /// Present for wallet logins only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    /// JWT ID
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Generate a session token for a user, issued now
///
/// # Arguments
/// * `user` - The authenticated user
/// * `secret` - JWT signing secret
/// * `ttl_seconds` - Token time-to-live in seconds
pub fn generate_token(user: &User, secret: &str, ttl_seconds: i64) -> Result<String, JwtError> {
    generate_token_at(user, secret, ttl_seconds, Utc::now())
}

/// Generate a session token as if issued at `now`
pub fn generate_token_at(
    user: &User,
    secret: &str,
    ttl_seconds: i64,
    now: DateTime<Utc>,
) -> Result<String, JwtError> {
    let exp = now + Duration::seconds(ttl_seconds);

    let claims = Claims {
        sub: user.id.to_string(),
        auth_type: user.auth_type(),
        wallet_address: user.wallet_address().map(str::to_string),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::EncodingFailed(e.to_string()))
}

/// Verify and decode a JWT token against the current time
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    verify_token_at(token, secret, Utc::now())
}

/// Verify and decode a JWT token as of `now`
///
/// # Returns
/// * `Ok(Claims)` if the signature is valid and `now` is before `exp`
/// * `Err(JwtError)` otherwise
pub fn verify_token_at(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| JwtError::DecodingFailed(e.to_string()))?;

    if now.timestamp() >= token_data.claims.exp {
        return Err(JwtError::TokenExpired);
    }

    Ok(token_data.claims)
}

/// Extract user ID from claims
pub fn get_user_id_from_claims(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Credentials;

    const SECRET: &str = "test-secret-key";

    fn wallet_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: Some("Test User".to_string()),
            credentials: Credentials::Wallet {
                wallet_address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".to_string(),
                nonce: "00".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn email_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: None,
            credentials: Credentials::Email {
                email: "test@example.com".to_string(),
                password_hash: "hash".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_wallet_token_carries_address() {
        let user = wallet_user();
        let token = generate_token(&user, SECRET, DEFAULT_TOKEN_TTL_SECONDS).unwrap();

        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.auth_type, AuthType::Wallet);
        assert_eq!(claims.wallet_address.as_deref(), user.wallet_address());
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(get_user_id_from_claims(&claims).unwrap(), user.id);
    }

    #[test]
    fn test_email_token_has_no_address() {
        let token = generate_token(&email_user(), SECRET, DEFAULT_TOKEN_TTL_SECONDS).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();

        assert_eq!(claims.auth_type, AuthType::Email);
        assert!(claims.wallet_address.is_none());
    }

    #[test]
    fn test_expiry_boundary() {
        let issued = Utc::now();
        let token =
            generate_token_at(&wallet_user(), SECRET, DEFAULT_TOKEN_TTL_SECONDS, issued).unwrap();

        let almost = issued + Duration::hours(23) + Duration::minutes(59);
        assert!(verify_token_at(&token, SECRET, almost).is_ok());

        let after = issued + Duration::hours(24) + Duration::minutes(1);
        assert!(matches!(
            verify_token_at(&token, SECRET, after),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let result = verify_token("invalid.token.here", SECRET);
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_token(&wallet_user(), "secret1", 900).unwrap();
        let result = verify_token(&token, "secret2");
        assert!(result.is_err());
    }
}
