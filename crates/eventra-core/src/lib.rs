//! # eventra-core
//!
//! Core types, traits, and abstractions for the eventra event-planning
//! marketplace.
//!
//! This crate provides the domain entities (users, events, venues, quotes,
//! notifications), the typed error taxonomy, the repository traits the
//! database layer implements, and the structured logging field schema.

pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;

use uuid::Uuid;

/// Generate a new UUIDv7 identifier.
///
/// UUIDv7 embeds a Unix timestamp in the first 48 bits, so ids sort
/// chronologically — "newest first" listings can order by id.
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}
