//! Request and response bodies for the authentication endpoints

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::AuthType;

/// Request to register an email/password account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank", message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request to log in with email/password
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request for a wallet challenge
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet_address: String,
}

/// Challenge the wallet must sign
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NonceResponse {
    pub nonce: String,
    pub message: String,
}

/// Request to verify a signed challenge
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletVerifyRequest {
    pub wallet_address: String,
    /// Hex-encoded 65-byte `r || s || v` signature; absent is treated as empty
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Generic `{ message }` body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EmailUserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletUserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub wallet_address: String,
}

/// Successful email/password login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: EmailUserSummary,
}

/// Successful wallet verification
#[derive(Debug, Serialize)]
pub struct WalletLoginResponse {
    pub token: String,
    pub user: WalletUserSummary,
}

/// User response (sanitized for API)
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub auth_type: AuthType,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}
