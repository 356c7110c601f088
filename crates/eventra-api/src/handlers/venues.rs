//! Venue catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use eventra_core::{
    clamp_pagination, CreateVenueRequest, Role, UpdateVenueRequest, VenueListFilter,
    VenueRepository,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::{success, success_message, success_with};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VenueListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub city: Option<String>,
    pub min_capacity: Option<i32>,
    pub max_price: Option<BigDecimal>,
}

impl VenueListQuery {
    fn filter(&self) -> VenueListFilter {
        VenueListFilter {
            city: self.city.clone(),
            min_capacity: self.min_capacity,
            max_price: self.max_price.clone(),
        }
    }
}

pub async fn create_venue(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateVenueRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Provider, Role::Admin])?;
    let venue = state.db.venues.insert(auth.user.id, req).await?;
    Ok((
        StatusCode::CREATED,
        success_with("venue created", venue),
    ))
}

pub async fn list_venues(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<VenueListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit, _) = clamp_pagination(query.page, query.limit);

    let venues = match auth.user.role {
        Role::Provider => {
            state
                .db
                .venues
                .list_for_provider(auth.user.id, page, limit)
                .await?
        }
        Role::Admin | Role::Organizer => {
            state.db.venues.list_all(query.filter(), page, limit).await?
        }
    };

    Ok(success(venues))
}

#[derive(Debug, Deserialize)]
pub struct VenueSearchQuery {
    pub q: String,
    pub city: Option<String>,
    pub min_capacity: Option<i32>,
    pub max_price: Option<BigDecimal>,
}

pub async fn search_venues(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(query): Query<VenueSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = VenueListFilter {
        city: query.city,
        min_capacity: query.min_capacity,
        max_price: query.max_price,
    };
    let hits = state.db.venues.search(&query.q, filter).await?;
    Ok(success(hits))
}

pub async fn get_venue(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let venue = state.db.venues.fetch(id).await?;
    Ok(success(venue))
}

/// Admins act as the venue's owner, everyone else as themselves.
async fn effective_owner(
    state: &AppState,
    auth: &RequireAuth,
    venue_id: Uuid,
) -> Result<Uuid, ApiError> {
    if auth.is_admin() {
        Ok(state.db.venues.fetch(venue_id).await?.venue.provider_id)
    } else {
        Ok(auth.user.id)
    }
}

pub async fn update_venue(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateVenueRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Provider, Role::Admin])?;
    let owner = effective_owner(&state, &auth, id).await?;
    let venue = state.db.venues.update(id, owner, patch).await?;
    Ok(success_with("venue updated", venue))
}

pub async fn delete_venue(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Provider, Role::Admin])?;
    let owner = effective_owner(&state, &auth, id).await?;
    state.db.venues.delete(id, owner).await?;
    Ok(success_message("venue deleted"))
}
