//! AI-assist handlers.
//!
//! These always answer 200 with a usable result; when the backend is
//! absent or fails, the planner's rule-based output is returned instead.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use eventra_assist::{AnalyzeRequirementsRequest, RecommendVenuesRequest};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::success;
use crate::state::AppState;

pub async fn recommend_venues(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(req): Json<RecommendVenuesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recommendation = state
        .planner
        .recommend_venues(&state.db.venues, req)
        .await?;
    Ok(success(recommendation))
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuoteRequest {
    pub venue_id: Uuid,
    pub event_id: Uuid,
}

pub async fn generate_quote(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(req): Json<GenerateQuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = state
        .planner
        .generate_quote(&state.db.venues, &state.db.events, req.venue_id, req.event_id)
        .await?;
    Ok(success(draft))
}

pub async fn analyze_requirements(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(req): Json<AnalyzeRequirementsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let analysis = state
        .planner
        .analyze_requirements(&state.db.venues, req)
        .await?;
    Ok(success(analysis))
}
