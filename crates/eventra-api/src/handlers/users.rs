//! Profile and notification handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use eventra_core::{validation, NotificationRepository, UpdateProfileRequest, UserRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::{success, success_with};
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.fetch(auth.user.id).await?;
    Ok(success(user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(patch): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(first_name) = &patch.first_name {
        validation::validate_person_name("first_name", first_name)?;
    }
    if let Some(last_name) = &patch.last_name {
        validation::validate_person_name("last_name", last_name)?;
    }
    if let Some(phone) = &patch.phone {
        validation::validate_phone(phone)?;
    }

    let user = state.db.users.update_profile(auth.user.id, patch).await?;
    Ok(success_with("profile updated", user))
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar_url: Option<String>,
}

pub async fn set_avatar(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<AvatarRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let avatar = req
        .avatar_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("avatar_url is required".to_string()))?;

    let user = state
        .db
        .users
        .update_profile(
            auth.user.id,
            UpdateProfileRequest {
                avatar: Some(avatar),
                ..Default::default()
            },
        )
        .await?;
    Ok(success_with("avatar updated", user))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = state.db.notifications.list_for_user(auth.user.id).await?;
    Ok(success(notifications))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state.db.notifications.mark_read(auth.user.id, id).await?;
    Ok(success_with("notification marked as read", notification))
}
