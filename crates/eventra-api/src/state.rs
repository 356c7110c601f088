//! Shared application state.

use std::sync::Arc;

use eventra_assist::AssistPlanner;
use eventra_db::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub planner: AssistPlanner,
    /// Lifetime of issued session tokens, seconds.
    pub token_ttl_secs: i64,
}
