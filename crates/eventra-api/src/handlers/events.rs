//! Event CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use chrono::NaiveDate;
use eventra_core::{
    clamp_pagination, CreateEventRequest, EventListFilter, EventRepository, EventStatus, Role,
    UpdateEventRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::{success, success_message, success_with};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<EventStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Organizer, Role::Admin])?;
    let event = state.db.events.insert(auth.user.id, req).await?;
    Ok((
        StatusCode::CREATED,
        success_with("event created", event),
    ))
}

pub async fn list_events(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<EventListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit, _) = clamp_pagination(query.page, query.limit);

    let events = match auth.user.role {
        Role::Organizer => {
            state
                .db
                .events
                .list_for_organizer(auth.user.id, page, limit)
                .await?
        }
        Role::Admin | Role::Provider => {
            let filter = EventListFilter {
                status: query.status,
                date_from: query.date_from,
                date_to: query.date_to,
            };
            state.db.events.list_all(filter, page, limit).await?
        }
    };

    Ok(success(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.db.events.fetch(id).await?;
    Ok(success(event))
}

/// Resolve the organizer id the ownership check runs against. Admins act
/// as the event's owner; everyone else acts as themselves.
async fn effective_owner(
    state: &AppState,
    auth: &RequireAuth,
    event_id: Uuid,
) -> Result<Uuid, ApiError> {
    if auth.is_admin() {
        Ok(state.db.events.fetch(event_id).await?.event.organizer_id)
    } else {
        Ok(auth.user.id)
    }
}

pub async fn update_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Organizer, Role::Admin])?;
    let owner = effective_owner(&state, &auth, id).await?;
    let event = state.db.events.update(id, owner, patch).await?;
    Ok(success_with("event updated", event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Organizer, Role::Admin])?;
    let owner = effective_owner(&state, &auth, id).await?;
    state.db.events.delete(id, owner).await?;
    Ok(success_message("event deleted"))
}
