//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{
    new_v7, CreateUserRecord, Error, Result, Role, UpdateProfileRequest, User, UserRepository,
};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL implementation of [`UserRepository`].
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_user_row(row: &PgRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: role.parse::<Role>()?,
        phone: row.get("phone"),
        avatar: row.get("avatar"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role::text AS role, phone, avatar, \
     created_at, updated_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, record: CreateUserRecord) -> Result<User> {
        let id = new_v7();
        let now = Utc::now();

        let row = sqlx::query(&format!(
            "INSERT INTO app_user (id, first_name, last_name, email, password_hash, role, phone, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6::user_role, $7, $8, $8)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(&record.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Error::Conflict("a user with this email already exists".to_string())
            }
            _ => Error::Database(e),
        })?;

        map_user_row(&row)
    }

    async fn fetch(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("user {id} not found")))?;

        map_user_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn update_profile(&self, id: Uuid, patch: UpdateProfileRequest) -> Result<User> {
        // $1 = now, $2 = id, dynamic params start at $3
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let mut param_idx = 3;

        if patch.first_name.is_some() {
            updates.push(format!("first_name = ${param_idx}"));
            param_idx += 1;
        }
        if patch.last_name.is_some() {
            updates.push(format!("last_name = ${param_idx}"));
            param_idx += 1;
        }
        if patch.phone.is_some() {
            updates.push(format!("phone = ${param_idx}"));
            param_idx += 1;
        }
        if patch.avatar.is_some() {
            updates.push(format!("avatar = ${param_idx}"));
        }

        let query = format!(
            "UPDATE app_user SET {} WHERE id = $2 RETURNING {USER_COLUMNS}",
            updates.join(", ")
        );

        let mut q = sqlx::query(&query).bind(Utc::now()).bind(id);
        if let Some(first_name) = &patch.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            q = q.bind(last_name);
        }
        if let Some(phone) = &patch.phone {
            q = q.bind(phone);
        }
        if let Some(avatar) = &patch.avatar {
            q = q.bind(avatar);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("user {id} not found")))?;

        map_user_row(&row)
    }
}
