//! Authentication extractors.
//!
//! Bearer tokens are the opaque `ev_at_` values issued at login; the
//! session repository resolves them to an [`AuthUser`]. `Auth` yields an
//! optional principal, `RequireAuth` rejects with 401.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use eventra_core::{AuthUser, Role, SessionRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for requests that may carry a token.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user: Option<AuthUser>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let user = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").trim();
                state.db.sessions.validate(token).await?
            }
            _ => None,
        };

        Ok(Auth { user })
    }
}

/// Extractor that requires a valid session token.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user: AuthUser,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;
        match auth.user {
            Some(user) => Ok(RequireAuth { user }),
            None => Err(ApiError::Unauthorized(
                "authentication required".to_string(),
            )),
        }
    }
}

impl RequireAuth {
    /// 403 unless the caller holds one of `roles`.
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.user.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "requires one of roles: {}",
                roles
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}
