//! Registration, login and token refresh.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;

use eventra_core::{
    validation, CreateUserRecord, Role, SessionRepository, UserPublic, UserRepository,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::{success, success_with};
use crate::state::AppState;

/// Hash a password with SHA-256, hex-encoded. The stored form is opaque to
/// everything outside this module.
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    pub phone: Option<String>,
}

fn default_role() -> Role {
    Role::Organizer
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.role == Role::Admin {
        return Err(ApiError::Forbidden(
            "admin accounts cannot self-register".to_string(),
        ));
    }
    validation::validate_person_name("first_name", &req.first_name)?;
    validation::validate_person_name("last_name", &req.last_name)?;
    validation::validate_password(&req.password)?;
    if let Some(phone) = &req.phone {
        validation::validate_phone(phone)?;
    }
    let email = validation::normalize_email(&req.email)?;

    let user = state
        .db
        .users
        .insert(CreateUserRecord {
            first_name: req.first_name,
            last_name: req.last_name,
            email,
            password_hash: hash_password(&req.password),
            role: req.role,
            phone: req.phone,
        })
        .await?;

    let token = state
        .db
        .sessions
        .create(user.id, state.token_ttl_secs)
        .await?;

    info!(
        subsystem = "api",
        op = "register",
        user_id = %user.id,
        role = user.role.as_str(),
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        success_with("registration successful", json!({ "user": user, "token": token })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validation::normalize_email(&req.email)?;

    // One message for unknown email and wrong password.
    let invalid = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = state
        .db
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if hash_password(&req.password) != user.password_hash {
        return Err(invalid());
    }

    let token = state
        .db
        .sessions
        .create(user.id, state.token_ttl_secs)
        .await?;

    info!(
        subsystem = "api",
        op = "login",
        user_id = %user.id,
        "User logged in"
    );

    Ok(success(json!({ "user": user, "token": token })))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .db
        .sessions
        .create(auth.user.id, state.token_ttl_secs)
        .await?;
    let user = state.db.users.fetch(auth.user.id).await?;

    Ok(success(json!({
        "user": UserPublic::from(&user),
        "token": token,
    })))
}
