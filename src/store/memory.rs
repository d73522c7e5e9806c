//! In-memory user store
//!
//! Holds records for the lifetime of the value that owns it. Used by the
//! test suites and by `STORAGE_BACKEND=memory` for local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{Credentials, User};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn wallet_matches(user: &User, wallet_address: &str) -> bool {
    user.wallet_address()
        .is_some_and(|stored| stored.eq_ignore_ascii_case(wallet_address))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .cloned())
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| wallet_matches(u, wallet_address))
            .cloned())
    }

    async fn insert_email_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.email().is_some_and(|e| e.eq_ignore_ascii_case(email)))
        {
            return Err(StoreError::Conflict);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: Some(name.to_string()),
            credentials: Credentials::Email {
                email: email.to_string(),
                password_hash: password_hash.to_string(),
            },
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn upsert_wallet_nonce(
        &self,
        wallet_address: &str,
        nonce: &str,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let now = Utc::now();

        if let Some(user) = users
            .values_mut()
            .find(|u| wallet_matches(u, wallet_address))
        {
            if let Credentials::Wallet { nonce: stored, .. } = &mut user.credentials {
                *stored = nonce.to_string();
            }
            user.updated_at = now;
            return Ok(user.clone());
        }

        let user = User {
            id: Uuid::new_v4(),
            name: None,
            credentials: Credentials::Wallet {
                wallet_address: wallet_address.to_string(),
                nonce: nonce.to_string(),
            },
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn rotate_wallet_nonce(
        &self,
        user_id: Uuid,
        expected_nonce: &str,
        next_nonce: &str,
        name: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;

        let Some(user) = users.get_mut(&user_id) else {
            return Ok(None);
        };
        let Credentials::Wallet { nonce, .. } = &mut user.credentials else {
            return Ok(None);
        };
        if nonce.as_str() != expected_nonce {
            return Ok(None);
        }

        *nonce = next_nonce.to_string();
        if user.name.is_none() {
            user.name = name.map(str::to_string);
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B";

    #[tokio::test]
    async fn test_upsert_creates_then_rotates() {
        let store = MemoryUserStore::new();

        let created = store.upsert_wallet_nonce(ADDRESS, "n1").await.unwrap();
        let updated = store
            .upsert_wallet_nonce(&ADDRESS.to_lowercase(), "n2")
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.nonce(), Some("n2"));
        // Address keeps the casing it was first stored with
        assert_eq!(updated.wallet_address(), Some(ADDRESS));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_rotate_requires_expected_nonce() {
        let store = MemoryUserStore::new();
        let user = store.upsert_wallet_nonce(ADDRESS, "n1").await.unwrap();

        let stale = store
            .rotate_wallet_nonce(user.id, "other", "n2", None)
            .await
            .unwrap();
        assert!(stale.is_none());

        let rotated = store
            .rotate_wallet_nonce(user.id, "n1", "n2", Some("Alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rotated.nonce(), Some("n2"));
        assert_eq!(rotated.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_rotate_keeps_existing_name() {
        let store = MemoryUserStore::new();
        let user = store.upsert_wallet_nonce(ADDRESS, "n1").await.unwrap();
        store
            .rotate_wallet_nonce(user.id, "n1", "n2", Some("Alice"))
            .await
            .unwrap();

        let rotated = store
            .rotate_wallet_nonce(user.id, "n2", "n3", Some("Mallory"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rotated.name.as_deref(), Some("Alice"));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryUserStore::new();
        store
            .insert_email_user("A", "a@example.com", "hash")
            .await
            .unwrap();

        let result = store.insert_email_user("B", "A@Example.com", "hash").await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_leave_one_record() {
        let store = MemoryUserStore::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert_wallet_nonce(ADDRESS, &format!("n{i}"))
                        .await
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 1);
        let user = store.find_by_wallet(ADDRESS).await.unwrap().unwrap();
        assert!(user.nonce().unwrap().starts_with('n'));
    }
}
