//! Account and session repository implementation.
//!
//! Passwords are stored as Argon2id PHC strings. Session tokens are random
//! and only their SHA-256 digest is persisted.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info, warn};
use uuid::Uuid;

use catalog_core::{new_v7, CreateUserRequest, Error, Result, Session, User, UserRepository};

use crate::map_write_error;

/// Length of generated session tokens.
pub const SESSION_TOKEN_LENGTH: usize = 48;

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a session token using SHA256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
    }

    fn verify_password(password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| Error::Internal(format!("stored password hash is malformed: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<String> {
        sqlx::query_scalar("SELECT password_hash FROM app_user WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
    }
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        is_staff: r.get("is_staff"),
        date_joined: r.get("date_joined"),
        last_login: r.get("last_login"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<Uuid> {
        req.validate()?;
        let id = new_v7();
        let hash = Self::hash_password(&req.password)?;

        sqlx::query(
            "INSERT INTO app_user (id, username, password_hash, is_staff, date_joined)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(req.username.trim())
        .bind(&hash)
        .bind(req.is_staff)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("user", e))?;

        info!(
            subsystem = "db",
            component = "users",
            op = "create",
            user_id = %id,
            is_staff = req.is_staff,
            "User created"
        );
        Ok(id)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, is_staff, date_joined, last_login
             FROM app_user WHERE username = $1",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let Some(row) = row else {
            debug!(
                subsystem = "db",
                component = "users",
                op = "authenticate",
                "Unknown username"
            );
            return Ok(None);
        };

        let stored: String = row.get("password_hash");
        if !Self::verify_password(password, &stored)? {
            warn!(
                subsystem = "db",
                component = "users",
                op = "authenticate",
                "Password mismatch"
            );
            return Ok(None);
        }

        let mut user = user_from_row(&row);
        let now = Utc::now();
        sqlx::query("UPDATE app_user SET last_login = $1 WHERE id = $2")
            .bind(now)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        user.last_login = Some(now);

        Ok(Some(user))
    }

    async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<String> {
        let token = Self::generate_secret(SESSION_TOKEN_LENGTH);
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO user_session (token_hash, user_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Self::hash_secret(&token))
        .bind(user_id)
        .bind(now)
        .bind(now + ttl)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error("session", e))?;

        debug!(
            subsystem = "db",
            component = "users",
            op = "create_session",
            user_id = %user_id,
            "Session opened"
        );
        Ok(token)
    }

    async fn session(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.is_staff, u.date_joined, u.last_login, s.expires_at
            FROM user_session s
            JOIN app_user u ON u.id = s.user_id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(Self::hash_secret(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| Session {
            user: user_from_row(&r),
            expires_at: r.get("expires_at"),
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_session WHERE token_hash = $1")
            .bind(Self::hash_secret(token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        keep_session: &str,
    ) -> Result<()> {
        let stored = self.password_hash(user_id).await?;
        if !Self::verify_password(old_password, &stored)? {
            return Err(Error::InvalidInput(
                "Your old password was entered incorrectly".to_string(),
            ));
        }

        let hash = Self::hash_password(new_password)?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("UPDATE app_user SET password_hash = $1 WHERE id = $2")
            .bind(&hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let closed = sqlx::query("DELETE FROM user_session WHERE user_id = $1 AND token_hash <> $2")
            .bind(user_id)
            .bind(Self::hash_secret(keep_session))
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "users",
            op = "change_password",
            user_id = %user_id,
            result_count = closed,
            "Password changed, other sessions closed"
        );
        Ok(())
    }
}
