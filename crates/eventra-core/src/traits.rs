//! Core traits for eventra abstractions.
//!
//! These traits define the interfaces the PostgreSQL layer implements and
//! the API layer consumes, keeping handlers testable against in-memory or
//! mock implementations.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USERS & SESSIONS
// =============================================================================

/// Record for inserting a new user. The password arrives already hashed;
/// the hashing primitive lives outside the repository layer.
#[derive(Debug, Clone)]
pub struct CreateUserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
}

/// Allow-listed profile patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// Repository for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Duplicate email surfaces as [`crate::Error::Conflict`].
    async fn insert(&self, record: CreateUserRecord) -> Result<User>;

    /// Fetch by id.
    async fn fetch(&self, id: Uuid) -> Result<User>;

    /// Look up by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Apply an allow-listed profile patch and return the updated user.
    async fn update_profile(&self, id: Uuid, patch: UpdateProfileRequest) -> Result<User>;
}

/// Repository for opaque bearer session tokens.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Issue a new token for the user; returns the plaintext token exactly
    /// once. Only its hash is stored.
    async fn create(&self, user_id: Uuid, ttl_secs: i64) -> Result<String>;

    /// Resolve a presented token to the authenticated caller, or `None`
    /// when unknown or expired.
    async fn validate(&self, token: &str) -> Result<Option<AuthUser>>;

    /// Drop expired rows. Best-effort housekeeping.
    async fn prune_expired(&self) -> Result<u64>;
}

// =============================================================================
// EVENTS
// =============================================================================

/// Request for creating an event. Drafts may be partial; only `name` is
/// required.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub guest_count: Option<i32>,
    pub budget: Option<BigDecimal>,
    pub status: Option<EventStatus>,
}

/// Allow-listed event patch. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub guest_count: Option<i32>,
    pub budget: Option<BigDecimal>,
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    /// Whether applying this patch to `current` is a draft → non-draft
    /// transition, i.e. the completeness rule must fire.
    pub fn finalizes(&self, current: &Event) -> bool {
        matches!(self.status, Some(s) if s != EventStatus::Draft)
            && current.status == EventStatus::Draft
    }

    /// The finalize fields whose effective value (patch if provided, else
    /// stored) is still null. Empty when the event may leave draft status.
    pub fn missing_finalize_fields(&self, current: &Event) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.or(current.date).is_none() {
            missing.push("date");
        }
        if self.start_time.or(current.start_time).is_none() {
            missing.push("start_time");
        }
        if self.end_time.or(current.end_time).is_none() {
            missing.push("end_time");
        }
        if self.guest_count.or(current.guest_count).is_none() {
            missing.push("guest_count");
        }
        if self.budget.as_ref().or(current.budget.as_ref()).is_none() {
            missing.push("budget");
        }
        missing
    }
}

/// Filters for the admin/provider event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventListFilter {
    pub status: Option<EventStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Repository for event CRUD, scoped to the owning organizer.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event for `organizer_id`. Status defaults to draft.
    async fn insert(&self, organizer_id: Uuid, req: CreateEventRequest) -> Result<Event>;

    /// Events owned by one organizer, newest first.
    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<EventWithOrganizer>>;

    /// All events with optional status/date-range filters, newest first.
    async fn list_all(
        &self,
        filter: EventListFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<EventWithOrganizer>>;

    /// Fetch by id with the organizer's public profile.
    async fn fetch(&self, id: Uuid) -> Result<EventWithOrganizer>;

    /// Apply an ownership-checked patch, enforcing the completeness rule on
    /// draft → non-draft transitions. The read-check-write sequence runs in
    /// one transaction.
    async fn update(&self, id: Uuid, organizer_id: Uuid, patch: UpdateEventRequest)
        -> Result<Event>;

    /// Ownership-checked hard delete; dependent quotes cascade at the
    /// storage layer.
    async fn delete(&self, id: Uuid, organizer_id: Uuid) -> Result<()>;
}

// =============================================================================
// VENUES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVenueRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub capacity: i32,
    pub price_per_day: BigDecimal,
    pub amenities: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Allow-listed venue patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateVenueRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<i32>,
    pub price_per_day: Option<BigDecimal>,
    pub amenities: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Filters shared by the venue listing and search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueListFilter {
    /// Case-insensitive city substring.
    pub city: Option<String>,
    pub min_capacity: Option<i32>,
    pub max_price: Option<BigDecimal>,
}

/// Cap on free-text search results.
pub const VENUE_SEARCH_LIMIT: i64 = 20;

/// Repository for venue CRUD and search, scoped to the owning provider.
#[async_trait]
pub trait VenueRepository: Send + Sync {
    async fn insert(&self, provider_id: Uuid, req: CreateVenueRequest) -> Result<Venue>;

    /// Venues owned by one provider, newest first.
    async fn list_for_provider(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<VenueWithProvider>>;

    /// All venues with optional filters, cheapest first.
    async fn list_all(
        &self,
        filter: VenueListFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<VenueWithProvider>>;

    /// Case-insensitive substring search across name/description/city/
    /// amenities, AND-combined with `filter`, cheapest first, capped at
    /// [`VENUE_SEARCH_LIMIT`].
    async fn search(&self, term: &str, filter: VenueListFilter) -> Result<Vec<VenueWithProvider>>;

    /// Fetch by id with the provider's public profile.
    async fn fetch(&self, id: Uuid) -> Result<VenueWithProvider>;

    async fn update(&self, id: Uuid, provider_id: Uuid, patch: UpdateVenueRequest)
        -> Result<Venue>;

    async fn delete(&self, id: Uuid, provider_id: Uuid) -> Result<()>;

    /// Deterministic candidate set for the assist planner: capacity ≥
    /// `min_capacity` (when given) and price ≤ `max_price` (when given),
    /// cheapest first, capped at `limit`.
    async fn candidates(
        &self,
        min_capacity: Option<i32>,
        max_price: Option<BigDecimal>,
        limit: i64,
    ) -> Result<Vec<Venue>>;

    /// The `limit` cheapest venues overall; the planner's fallback when the
    /// filtered candidate set is empty.
    async fn cheapest(&self, limit: i64) -> Result<Vec<Venue>>;
}

// =============================================================================
// QUOTES
// =============================================================================

/// Request for creating a quote. The issuing provider comes from the
/// authenticated caller, never the body; status is always draft on create.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuoteRequest {
    pub event_id: Uuid,
    pub venue_id: Option<Uuid>,
    pub items: Vec<QuoteItem>,
    pub subtotal: BigDecimal,
    #[serde(default)]
    pub vat: Option<BigDecimal>,
    pub total: BigDecimal,
    pub valid_until: Option<DateTime<Utc>>,
}

/// Repository for the quote negotiation lifecycle.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Insert a new draft quote issued by `provider_id`. Referential
    /// existence of the event (and venue, when given) is validated before
    /// the insert so missing parents surface as NotFound, not a raw FK
    /// violation.
    async fn insert(&self, provider_id: Uuid, req: CreateQuoteRequest) -> Result<Quote>;

    /// Quotes issued by one provider, newest first.
    async fn list_by_provider(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>>;

    /// Quotes whose event belongs to one organizer (join through event),
    /// newest first.
    async fn list_by_organizer(
        &self,
        organizer_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>>;

    /// All quotes for one event, unpaginated, newest first. Backs the
    /// "compare quotes for my event" view.
    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<QuoteWithDetails>>;

    /// Quotes placed against any venue owned by `provider_id` — distinct
    /// from quotes the provider issued. Empty page when the provider owns
    /// no venues.
    async fn list_for_provider_venues(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>>;

    /// Flat ownership projection for authorization decisions.
    async fn load_with_event_owner(&self, id: Uuid) -> Result<QuoteWithParties>;

    /// Write the new status after the caller has been authorized against
    /// [`QuoteWithParties`]. No prior-status guard: transitions are
    /// idempotent-by-overwrite.
    async fn update_status(&self, id: Uuid, status: QuoteStatus) -> Result<Quote>;

    /// Quote with event (+ organizer), venue and provider eagerly joined.
    async fn fetch_details(&self, id: Uuid) -> Result<QuoteWithDetails>;
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<Uuid>,
}

/// Repository for per-user inbox records.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, req: CreateNotificationRequest) -> Result<Notification>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    /// Owner-checked mark-read; NotFound when the row belongs to someone
    /// else.
    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<Notification>;
}

// =============================================================================
// ASSIST BACKEND
// =============================================================================

/// Text-generation backend behind the AI-assist boundary.
///
/// Injected as a dependency (never a process global) so the planner is
/// testable with the deterministic mock and deployable without credentials.
#[async_trait]
pub trait AssistBackend: Send + Sync {
    /// Generate a completion for `prompt`. Any transport, credential or
    /// model failure is an error the planner converts into its fallback
    /// result — callers of the planner never see it.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend identifier for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_event(with_fields: bool) -> Event {
        Event {
            id: Uuid::now_v7(),
            name: "Launch".into(),
            description: None,
            date: with_fields.then(|| NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            start_time: with_fields.then(|| NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            end_time: with_fields.then(|| NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
            guest_count: with_fields.then_some(120),
            budget: with_fields.then(|| BigDecimal::from(5_000)),
            status: EventStatus::Draft,
            organizer_id: Uuid::now_v7(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_finalize_detection() {
        let event = draft_event(false);
        let patch = UpdateEventRequest {
            status: Some(EventStatus::Confirmed),
            ..Default::default()
        };
        assert!(patch.finalizes(&event));

        // Draft → draft never fires the rule.
        let keep_draft = UpdateEventRequest {
            status: Some(EventStatus::Draft),
            ..Default::default()
        };
        assert!(!keep_draft.finalizes(&event));

        // Already-finalized events are not re-checked.
        let mut confirmed = draft_event(true);
        confirmed.status = EventStatus::Planning;
        assert!(!patch.finalizes(&confirmed));
    }

    #[test]
    fn test_missing_fields_names_every_null() {
        let event = draft_event(false);
        let patch = UpdateEventRequest {
            status: Some(EventStatus::Confirmed),
            ..Default::default()
        };
        assert_eq!(
            patch.missing_finalize_fields(&event),
            vec!["date", "start_time", "end_time", "guest_count", "budget"]
        );
    }

    #[test]
    fn test_patch_values_count_as_effective() {
        let event = draft_event(false);
        let patch = UpdateEventRequest {
            status: Some(EventStatus::Confirmed),
            date: Some(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            guest_count: Some(80),
            ..Default::default()
        };
        assert_eq!(
            patch.missing_finalize_fields(&event),
            vec!["start_time", "end_time", "budget"]
        );
    }

    #[test]
    fn test_complete_event_has_no_missing_fields() {
        let event = draft_event(true);
        let patch = UpdateEventRequest {
            status: Some(EventStatus::Confirmed),
            ..Default::default()
        };
        assert!(patch.missing_finalize_fields(&event).is_empty());
    }

    #[test]
    fn test_budget_accepts_fractional_amounts() {
        use std::str::FromStr;

        let req: CreateEventRequest =
            serde_json::from_str(r#"{"name": "Launch party", "budget": 2500.50}"#).unwrap();
        assert_eq!(req.budget, Some(BigDecimal::from_str("2500.50").unwrap()));
    }
}
