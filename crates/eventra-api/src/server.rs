//! Router construction and HTTP middleware stack.

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::handlers::{self, success};
use crate::state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

pub fn parse_allowed_origins() -> Vec<HeaderValue> {
    std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect()
}

async fn health() -> impl IntoResponse {
    success(serde_json::json!({
        "service": "eventra-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
        // Events
        .route(
            "/events",
            post(handlers::events::create_event).get(handlers::events::list_events),
        )
        .route(
            "/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .patch(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        // Venues
        .route(
            "/venues",
            post(handlers::venues::create_venue).get(handlers::venues::list_venues),
        )
        .route("/venues/search", get(handlers::venues::search_venues))
        .route(
            "/venues/:id",
            get(handlers::venues::get_venue)
                .put(handlers::venues::update_venue)
                .delete(handlers::venues::delete_venue),
        )
        // Quotes
        .route(
            "/quotes",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route("/quotes/organizer", get(handlers::quotes::organizer_quotes))
        .route("/quotes/provider", get(handlers::quotes::provider_quotes))
        .route("/quotes/:id", get(handlers::quotes::get_quote))
        .route("/quotes/:id/accept", put(handlers::quotes::accept_quote))
        .route("/quotes/:id/reject", put(handlers::quotes::reject_quote))
        .route(
            "/quotes/:id/negotiate",
            put(handlers::quotes::negotiate_quote),
        )
        // AI assist
        .route(
            "/ai/recommendations",
            post(handlers::assist::recommend_venues),
        )
        .route("/ai/generate-quote", post(handlers::assist::generate_quote))
        .route(
            "/ai/analyze-requirements",
            post(handlers::assist::analyze_requirements),
        )
        // Profile & notifications
        .route(
            "/users/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route("/users/avatar", post(handlers::users::set_avatar))
        .route(
            "/users/notifications",
            get(handlers::users::list_notifications),
        )
        .route(
            "/users/notifications/:id/read",
            put(handlers::users::mark_notification_read),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600)),
        )
        .with_state(state)
}
