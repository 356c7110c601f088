//! # eventra-db
//!
//! PostgreSQL database layer for eventra.
//!
//! This crate provides:
//! - Connection pool management and schema migrations
//! - Repository implementations for users, sessions, events, venues,
//!   quotes and notifications
//! - Opaque bearer token storage (SHA-256 hashed at rest)
//!
//! ## Example
//!
//! ```rust,ignore
//! use eventra_db::{Database, EventRepository, CreateEventRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = eventra_db::create_pool("postgres://localhost/eventra").await?;
//!     let db = Database::new(pool);
//!
//!     let event = db
//!         .events
//!         .insert(organizer_id, CreateEventRequest { .. })
//!         .await?;
//!     println!("Created event: {}", event.id);
//!     Ok(())
//! }
//! ```

pub mod events;
pub mod notifications;
pub mod pool;
pub mod quotes;
pub mod sessions;
pub mod users;
pub mod venues;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use eventra_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use events::PgEventRepository;
pub use notifications::PgNotificationRepository;
pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, run_migrations, PoolConfig,
};
pub use quotes::PgQuoteRepository;
pub use sessions::{PgSessionRepository, TOKEN_PREFIX};
pub use users::PgUserRepository;
pub use venues::PgVenueRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Bearer session token repository.
    pub sessions: PgSessionRepository,
    /// Event repository, scoped to the owning organizer.
    pub events: PgEventRepository,
    /// Venue catalog repository, scoped to the owning provider.
    pub venues: PgVenueRepository,
    /// Quote negotiation repository.
    pub quotes: PgQuoteRepository,
    /// Per-user notification inbox repository.
    pub notifications: PgNotificationRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            events: PgEventRepository::new(pool.clone()),
            venues: PgVenueRepository::new(pool.clone()),
            quotes: PgQuoteRepository::new(pool.clone()),
            notifications: PgNotificationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect to the database and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50% off_deal"), "50\\% off\\_deal");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
