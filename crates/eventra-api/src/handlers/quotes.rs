//! Quote negotiation handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use eventra_core::{
    clamp_pagination, CreateNotificationRequest, CreateQuoteRequest, NotificationRepository, Page,
    QuoteAction, QuoteRepository, QuoteWithDetails, QuoteWithParties, Role,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::{success, success_with};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct QuoteListQuery {
    pub event_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn create_quote(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Provider, Role::Admin])?;
    let quote = state.db.quotes.insert(auth.user.id, req).await?;
    Ok((
        StatusCode::CREATED,
        success_with("quote created", quote),
    ))
}

pub async fn list_quotes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // An explicit event filter backs the "compare quotes for my event"
    // view and is available to every role, unpaginated.
    if let Some(event_id) = query.event_id {
        let quotes = state.db.quotes.list_by_event(event_id).await?;
        return Ok(success(quotes));
    }

    let (page, limit, _) = clamp_pagination(query.page, query.limit);
    let quotes = match auth.user.role {
        Role::Provider => {
            state
                .db
                .quotes
                .list_by_provider(auth.user.id, page, limit)
                .await?
        }
        Role::Organizer => {
            state
                .db
                .quotes
                .list_by_organizer(auth.user.id, page, limit)
                .await?
        }
        Role::Admin => Page::<QuoteWithDetails>::empty(page),
    };

    Ok(success(quotes))
}

pub async fn organizer_quotes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit, _) = clamp_pagination(query.page, query.limit);
    let quotes = state
        .db
        .quotes
        .list_by_organizer(auth.user.id, page, limit)
        .await?;
    Ok(success(quotes))
}

/// Quotes placed against the caller's venues, not quotes the caller issued.
pub async fn provider_quotes(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_role(&[Role::Provider, Role::Admin])?;
    let (page, limit, _) = clamp_pagination(query.page, query.limit);
    let quotes = state
        .db
        .quotes
        .list_for_provider_venues(auth.user.id, page, limit)
        .await?;
    Ok(success(quotes))
}

pub async fn get_quote(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let parties = state.db.quotes.load_with_event_owner(id).await?;
    if !parties.caller_may_act(&auth.user) {
        return Err(ApiError::Forbidden(
            "not a party to this quote".to_string(),
        ));
    }
    let details = state.db.quotes.fetch_details(id).await?;
    Ok(success(details))
}

pub async fn accept_quote(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_quote(state, auth, id, QuoteAction::Accept).await
}

pub async fn reject_quote(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_quote(state, auth, id, QuoteAction::Reject).await
}

pub async fn negotiate_quote(
    state: State<AppState>,
    auth: RequireAuth,
    id: Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    transition_quote(state, auth, id, QuoteAction::Negotiate).await
}

async fn transition_quote(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    action: QuoteAction,
) -> Result<impl IntoResponse, ApiError> {
    let parties = state.db.quotes.load_with_event_owner(id).await?;
    if !parties.caller_may_act(&auth.user) {
        return Err(ApiError::Forbidden(
            "not a party to this quote".to_string(),
        ));
    }

    let target = action.target_status();
    let quote = state.db.quotes.update_status(id, target).await?;

    info!(
        subsystem = "api",
        op = "quote_transition",
        quote_id = %id,
        user_id = %auth.user.id,
        status = target.as_str(),
        "Quote status updated"
    );

    notify_counterparty(&state, &auth, &parties, target.as_str()).await;

    Ok(success_with("quote status updated", quote))
}

/// Best-effort inbox record for the other side of the negotiation. A
/// failure here must not fail the transition that already committed.
async fn notify_counterparty(
    state: &AppState,
    auth: &RequireAuth,
    parties: &QuoteWithParties,
    status: &str,
) {
    let recipient = if auth.user.id == parties.quote.provider_id {
        parties.event_organizer_id
    } else {
        parties.quote.provider_id
    };

    let result = state
        .db
        .notifications
        .insert(CreateNotificationRequest {
            user_id: recipient,
            title: format!("Quote {status}"),
            message: format!("A quote you are involved in is now {status}."),
            kind: "quote".to_string(),
            related_entity_type: Some("quote".to_string()),
            related_entity_id: Some(parties.quote.id),
        })
        .await;

    if let Err(e) = result {
        warn!(
            subsystem = "api",
            op = "quote_notify",
            quote_id = %parties.quote.id,
            error = %e,
            "Failed to record counterparty notification"
        );
    }
}
