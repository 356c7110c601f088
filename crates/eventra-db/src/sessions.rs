//! Opaque bearer session token repository.
//!
//! Tokens are `ev_at_`-prefixed random strings handed to the client exactly
//! once; only their SHA-256 hash is stored. Validation joins through
//! `app_user` so the resolved principal carries the caller's role.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{new_v7, AuthUser, Error, Result, Role, SessionRepository};

/// Prefix distinguishing eventra access tokens from arbitrary bearer values.
pub const TOKEN_PREFIX: &str = "ev_at_";

/// Random characters in a freshly issued token.
const TOKEN_RANDOM_LEN: usize = 48;

/// PostgreSQL implementation of [`SessionRepository`].
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
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

    /// Hash a secret using SHA-256.
    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<String> {
        let token = format!("{TOKEN_PREFIX}{}", Self::generate_secret(TOKEN_RANDOM_LEN));
        let token_hash = Self::hash_secret(&token);
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO session (id, user_id, token_hash, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(&token_hash)
        .bind(now + Duration::seconds(ttl_secs))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<AuthUser>> {
        if !token.starts_with(TOKEN_PREFIX) {
            return Ok(None);
        }
        let token_hash = Self::hash_secret(token);

        let row = sqlx::query(
            "SELECT u.id, u.role::text AS role
             FROM session s
             JOIN app_user u ON u.id = s.user_id
             WHERE s.token_hash = $1 AND s.expires_at > $2",
        )
        .bind(&token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => {
                let role: String = row.get("role");
                Ok(Some(AuthUser {
                    id: row.get("id"),
                    role: role.parse::<Role>()?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn prune_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
