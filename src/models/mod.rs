//! Data models for the authentication backend

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod auth;
pub use auth::*;

/// How a user proves their identity
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Email,
    Wallet,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Email => "email",
            AuthType::Wallet => "wallet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(AuthType::Email),
            "wallet" => Some(AuthType::Wallet),
            _ => None,
        }
    }
}

/// Credential branch of a user record.
///
/// Exactly one branch exists per user and it never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Email {
        email: String,
        password_hash: String,
    },
    Wallet {
        /// Stored as provided; compared case-insensitively
        wallet_address: String,
        /// Current single-use challenge value
        nonce: String,
    },
}

/// User model
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub credentials: Credentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn auth_type(&self) -> AuthType {
        match self.credentials {
            Credentials::Email { .. } => AuthType::Email,
            Credentials::Wallet { .. } => AuthType::Wallet,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Email { email, .. } => Some(email),
            Credentials::Wallet { .. } => None,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Email { password_hash, .. } => Some(password_hash),
            Credentials::Wallet { .. } => None,
        }
    }

    pub fn wallet_address(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Wallet { wallet_address, .. } => Some(wallet_address),
            Credentials::Email { .. } => None,
        }
    }

    pub fn nonce(&self) -> Option<&str> {
        match &self.credentials {
            Credentials::Wallet { nonce, .. } => Some(nonce),
            Credentials::Email { .. } => None,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            auth_type: user.auth_type(),
            email: user.email().map(str::to_string),
            wallet_address: user.wallet_address().map(str::to_string),
            name: user.name,
            created_at: user.created_at,
        }
    }
}
