//! Credential store
//!
//! All user state lives behind [`UserStore`]. The service never caches
//! records between requests, so any number of instances can share one
//! backing database.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Store-level errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Unique constraint violated")]
    Conflict,

    #[error("Corrupt user record {0}: {1}")]
    CorruptRecord(Uuid, String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict,
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Data-access interface for user records.
///
/// Email and wallet address lookups are case-insensitive. Each mutating
/// call is a single atomic write, so concurrent calls for the same wallet
/// never leave a record half-updated.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Any user whose email matches, regardless of auth type
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if the email is taken.
    async fn insert_email_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    /// Create the wallet user with `nonce`, or overwrite the nonce of the
    /// existing one.
    async fn upsert_wallet_nonce(
        &self,
        wallet_address: &str,
        nonce: &str,
    ) -> Result<User, StoreError>;

    /// Swap `expected_nonce` for `next_nonce` and set `name` if the user has
    /// none yet. Returns `None` when the stored nonce is no longer
    /// `expected_nonce`.
    async fn rotate_wallet_nonce(
        &self,
        user_id: Uuid,
        expected_nonce: &str,
        next_nonce: &str,
        name: Option<&str>,
    ) -> Result<Option<User>, StoreError>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> Result<(), StoreError>;
}
