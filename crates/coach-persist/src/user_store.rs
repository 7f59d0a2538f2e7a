//! User accounts
//!
//! Passwords are stored as argon2 PHC strings, never in plaintext.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::backend::StorageError;
use crate::sqlite::SqliteBackend;

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed user store
#[derive(Debug, Clone)]
pub struct UserStore {
    backend: SqliteBackend,
}

impl UserStore {
    pub fn new(backend: SqliteBackend) -> Self {
        Self { backend }
    }

    /// Register a new user.
    ///
    /// Fails with [`StorageError::AlreadyExists`] when the username or email
    /// is taken.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, StorageError> {
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(self.backend.pool())
        .await
        .map_err(|e| match StorageError::from(e) {
            StorageError::AlreadyExists(_) => {
                StorageError::AlreadyExists("Username or email already exists".to_string())
            }
            other => other,
        })?;

        tracing::info!(user_id = %record.id, username = %record.username, "Registered user");
        Ok(record)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.backend.pool())
        .await?;

        row.as_ref().map(user_from_row).transpose().map_err(StorageError::from)
    }

    /// Check credentials. Unknown user and wrong password both yield `None`.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Option<UserRecord>, StorageError> {
        let Some(user) = self.find_by_username(username).await? else {
            return Ok(None);
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| StorageError::Internal(format!("Stored hash unreadable: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

fn user_from_row(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn hash_password(password: &str) -> Result<String, StorageError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::Internal(format!("Password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteConfig;

    async fn store() -> UserStore {
        UserStore::new(SqliteBackend::new_with_config(SqliteConfig::memory()).await.unwrap())
    }

    #[tokio::test]
    async fn test_register_and_verify() {
        let users = store().await;
        let created = users.create("alice", "alice@example.com", "hunter22").await.unwrap();
        assert!(created.password_hash.starts_with("$argon2"));
        assert_ne!(created.password_hash, "hunter22");

        let ok = users.verify("alice", "hunter22").await.unwrap();
        assert_eq!(ok.map(|u| u.id), Some(created.id));

        assert!(users.verify("alice", "wrong").await.unwrap().is_none());
        assert!(users.verify("nobody", "hunter22").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email() {
        let users = store().await;
        users.create("bob", "bob@example.com", "pw").await.unwrap();

        let same_name = users.create("bob", "other@example.com", "pw").await;
        assert!(matches!(same_name, Err(StorageError::AlreadyExists(_))));

        let same_email = users.create("bobby", "bob@example.com", "pw").await;
        assert!(matches!(same_email, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn test_hash_is_not_serialized() {
        let user = UserRecord {
            id: "1".to_string(),
            username: "u".to_string(),
            email: "e".to_string(),
            password_hash: "secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
    }
}
