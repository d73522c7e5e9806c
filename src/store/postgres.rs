//! PostgreSQL-backed user store

use async_trait::async_trait;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{AuthType, Credentials, User};

const USER_COLUMNS: &str =
    "id, auth_type, name, email, password_hash, wallet_address, nonce, created_at, updated_at";

/// Flat row as stored in the `users` table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    auth_type: String,
    name: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
    wallet_address: Option<String>,
    nonce: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let credentials = match AuthType::parse(&row.auth_type) {
            Some(AuthType::Email) => match (row.email, row.password_hash) {
                (Some(email), Some(password_hash)) => Credentials::Email {
                    email,
                    password_hash,
                },
                _ => {
                    return Err(StoreError::CorruptRecord(
                        row.id,
                        "email user without email or password hash".to_string(),
                    ))
                }
            },
            Some(AuthType::Wallet) => match (row.wallet_address, row.nonce) {
                (Some(wallet_address), Some(nonce)) => Credentials::Wallet {
                    wallet_address,
                    nonce,
                },
                _ => {
                    return Err(StoreError::CorruptRecord(
                        row.id,
                        "wallet user without address or nonce".to_string(),
                    ))
                }
            },
            None => {
                return Err(StoreError::CorruptRecord(
                    row.id,
                    format!("unknown auth type '{}'", row.auth_type),
                ))
            }
        };

        Ok(User {
            id: row.id,
            name: row.name,
            credentials,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_user(row: Option<UserRow>) -> Result<Option<User>, StoreError> {
    row.map(User::try_from).transpose()
}

/// User store on a PostgreSQL pool
#[derive(Clone)]
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;

        into_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?;

        into_user(row)
    }

    async fn find_by_wallet(&self, wallet_address: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE auth_type = 'wallet' AND lower(wallet_address) = lower($1)
            "#
        ))
        .bind(wallet_address)
        .fetch_optional(&self.db_pool)
        .await?;

        into_user(row)
    }

    async fn insert_email_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, auth_type, name, email, password_hash, created_at, updated_at)
            VALUES ($1, 'email', $2, $3, $4, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db_pool)
        .await?;

        row.try_into()
    }

    async fn upsert_wallet_nonce(
        &self,
        wallet_address: &str,
        nonce: &str,
    ) -> Result<User, StoreError> {
        // Single statement so concurrent requests resolve to last-write-wins
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, auth_type, wallet_address, nonce, created_at, updated_at)
            VALUES ($1, 'wallet', $2, $3, NOW(), NOW())
            ON CONFLICT (lower(wallet_address)) WHERE auth_type = 'wallet'
            DO UPDATE SET nonce = EXCLUDED.nonce, updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(wallet_address)
        .bind(nonce)
        .fetch_one(&self.db_pool)
        .await?;

        row.try_into()
    }

    async fn rotate_wallet_nonce(
        &self,
        user_id: Uuid,
        expected_nonce: &str,
        next_nonce: &str,
        name: Option<&str>,
    ) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET nonce = $3, name = COALESCE(name, $4), updated_at = NOW()
            WHERE id = $1 AND auth_type = 'wallet' AND nonce = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(expected_nonce)
        .bind(next_nonce)
        .bind(name)
        .fetch_optional(&self.db_pool)
        .await?;

        into_user(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(auth_type: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            auth_type: auth_type.to_string(),
            name: None,
            email: None,
            password_hash: None,
            wallet_address: None,
            nonce: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_wallet_row_converts() {
        let mut wallet = row("wallet");
        wallet.wallet_address = Some("0x00000000000000000000000000000000000000aa".to_string());
        wallet.nonce = Some("ff".to_string());

        let user = User::try_from(wallet).unwrap();
        assert_eq!(user.auth_type(), AuthType::Wallet);
        assert_eq!(user.nonce(), Some("ff"));
    }

    #[test]
    fn test_row_missing_branch_is_corrupt() {
        let mut email = row("email");
        email.email = Some("a@example.com".to_string());

        assert!(matches!(
            User::try_from(email),
            Err(StoreError::CorruptRecord(_, _))
        ));
        assert!(matches!(
            User::try_from(row("metamask")),
            Err(StoreError::CorruptRecord(_, _))
        ));
    }
}
