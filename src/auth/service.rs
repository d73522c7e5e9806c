//! Authentication service
//!
//! Core business logic for email/password and wallet authentication.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{NonceResponse, User};
use crate::store::{StoreError, UserStore};

use super::crypto::{is_valid_address, verify_wallet_signature, CryptoError};
use super::jwt::{generate_token, verify_token, Claims, JwtError};
use super::nonce::{challenge_message, generate_nonce};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid wallet address: {0}")]
    InvalidWalletAddress(String),

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AuthError::UserExists,
            other => AuthError::Storage(other),
        }
    }
}

impl From<CryptoError> for AuthError {
    fn from(e: CryptoError) -> Self {
        AuthError::InvalidSignature(e.to_string())
    }
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub token: String,
    pub user: User,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt_secret: String,
    token_ttl_seconds: i64,
    bcrypt_cost: u32,
    app_name: String,
    store_timeout: Duration,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt_secret: String,
        token_ttl_seconds: i64,
        bcrypt_cost: u32,
        app_name: String,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl_seconds,
            bcrypt_cost,
            app_name,
            store_timeout,
        }
    }

    pub fn from_config(store: Arc<dyn UserStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.jwt_secret.clone(),
            config.jwt_ttl_seconds,
            config.bcrypt_cost,
            config.app_name.clone(),
            Duration::from_millis(config.store_timeout_ms),
        )
    }

    /// Run a store call with the configured deadline
    async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    /// Register an email/password user
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        if self.timed(self.store.find_by_email(email)).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = hash_password(password.to_string(), self.bcrypt_cost).await?;

        // A concurrent registration can still win; the store reports it as a conflict
        let user = self
            .timed(self.store.insert_email_user(name, email, &password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Log in with email/password and issue a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSuccess, AuthError> {
        let user = self
            .timed(self.store.find_by_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password_hash = user
            .password_hash()
            .ok_or(AuthError::UserNotFound)?
            .to_string();

        if !verify_password(password.to_string(), password_hash).await? {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token(&user, &self.jwt_secret, self.token_ttl_seconds)?;
        Ok(AuthSuccess { token, user })
    }

    /// Issue (or rotate) the challenge nonce for a wallet
    pub async fn issue_nonce(&self, wallet_address: &str) -> Result<NonceResponse, AuthError> {
        if !is_valid_address(wallet_address) {
            return Err(AuthError::InvalidWalletAddress(wallet_address.to_string()));
        }

        let user = self
            .timed(self.store.upsert_wallet_nonce(wallet_address, &generate_nonce()))
            .await?;
        let nonce = user
            .nonce()
            .ok_or_else(|| AuthError::Internal("wallet user without nonce".to_string()))?
            .to_string();

        tracing::debug!(user_id = %user.id, "Nonce issued");
        Ok(NonceResponse {
            message: challenge_message(&self.app_name, &nonce),
            nonce,
        })
    }

    /// Verify a signed challenge and issue a session token.
    ///
    /// The nonce is rotated on every attempt, so a signature is usable at
    /// most once and a failed attempt cannot be retried against the same
    /// challenge.
    pub async fn verify_wallet(
        &self,
        wallet_address: &str,
        signature: &str,
        name: Option<&str>,
    ) -> Result<AuthSuccess, AuthError> {
        if !is_valid_address(wallet_address) {
            return Err(AuthError::InvalidWalletAddress(wallet_address.to_string()));
        }

        let user = self
            .timed(self.store.find_by_wallet(wallet_address))
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let current_nonce = user.nonce().ok_or(AuthError::UserNotFound)?.to_string();

        let message = challenge_message(&self.app_name, &current_nonce);
        let outcome = verify_wallet_signature(wallet_address, &message, signature);

        let name = match outcome {
            Ok(()) => name.map(str::trim).filter(|n| !n.is_empty()),
            Err(_) => None,
        };
        let rotated = self
            .timed(self.store.rotate_wallet_nonce(
                user.id,
                &current_nonce,
                &generate_nonce(),
                name,
            ))
            .await?;

        if let Err(e) = outcome {
            tracing::warn!(user_id = %user.id, error = %e, "Signature rejected");
            return Err(e.into());
        }

        // Another request consumed this nonce between our read and write
        let user = rotated.ok_or_else(|| {
            AuthError::InvalidSignature("challenge already used".to_string())
        })?;

        let token = generate_token(&user, &self.jwt_secret, self.token_ttl_seconds)?;
        tracing::info!(user_id = %user.id, "Wallet verified");
        Ok(AuthSuccess { token, user })
    }

    /// Validate a session token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(verify_token(token, &self.jwt_secret)?)
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.timed(self.store.find_by_id(user_id))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Check that the store answers within the deadline
    pub async fn storage_health(&self) -> Result<(), AuthError> {
        Ok(self.timed(self.store.ping()).await?)
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}
