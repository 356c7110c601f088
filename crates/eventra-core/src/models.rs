//! Core data models for eventra.
//!
//! These types are shared across all eventra crates and represent the
//! marketplace domain entities: users, events, venues, quotes and
//! notifications.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ROLES & AUTH
// =============================================================================

/// Marketplace role.
///
/// A closed enum so every authorization point matches exhaustively; an
/// unhandled role is a compile-time error, not a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    Provider,
}

impl Role {
    /// Database/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organizer => "organizer",
            Role::Provider => "provider",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "organizer" => Ok(Role::Organizer),
            "provider" => Ok(Role::Provider),
            other => Err(crate::Error::Validation(format!("unknown role: {other}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller, as resolved by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

// =============================================================================
// USERS
// =============================================================================

/// A registered user. The password hash never leaves the identity layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public profile fields, safe to embed in other entities' responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for UserPublic {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        }
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Event lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Planning,
    Confirmed,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Planning => "planning",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EventStatus::Draft),
            "planning" => Ok(EventStatus::Planning),
            "confirmed" => Ok(EventStatus::Confirmed),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(crate::Error::Validation(format!(
                "unknown event status: {other}"
            ))),
        }
    }
}

/// An organizer's event. Scheduling fields stay nullable while the event is
/// a draft; the completeness rule fires when it leaves draft status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub guest_count: Option<i32>,
    pub budget: Option<BigDecimal>,
    pub status: EventStatus,
    pub organizer_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event with the organizer's public profile joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventWithOrganizer {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: UserPublic,
}

// =============================================================================
// VENUES
// =============================================================================

/// A provider's venue listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub capacity: i32,
    pub price_per_day: BigDecimal,
    pub amenities: Option<String>,
    /// Image URLs, order-preserving.
    pub images: Vec<String>,
    pub provider_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venue with the provider's public profile joined in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueWithProvider {
    #[serde(flatten)]
    pub venue: Venue,
    pub provider: UserPublic,
}

// =============================================================================
// QUOTES
// =============================================================================

/// Quote negotiation status.
///
/// `Expired` is a value display logic may apply once `valid_until` elapses;
/// no background sweep performs that transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Negotiating,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
            QuoteStatus::Negotiating => "negotiating",
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            "expired" => Ok(QuoteStatus::Expired),
            "negotiating" => Ok(QuoteStatus::Negotiating),
            other => Err(crate::Error::Validation(format!(
                "unknown quote status: {other}"
            ))),
        }
    }
}

/// The three transition actions the API exposes on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteAction {
    Accept,
    Reject,
    Negotiate,
}

impl QuoteAction {
    /// The status this action writes.
    pub fn target_status(&self) -> QuoteStatus {
        match self {
            QuoteAction::Accept => QuoteStatus::Accepted,
            QuoteAction::Reject => QuoteStatus::Rejected,
            QuoteAction::Negotiate => QuoteStatus::Negotiating,
        }
    }
}

/// A single priced line on a quote. Stored as an ordered JSONB array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<BigDecimal>,
}

/// A provider's priced proposal against an organizer's event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub event_id: Uuid,
    /// May be null when the quote precedes venue selection.
    pub venue_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub items: Vec<QuoteItem>,
    pub subtotal: BigDecimal,
    pub vat: BigDecimal,
    pub total: BigDecimal,
    pub status: QuoteStatus,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quote with event, venue and provider eagerly joined for detail views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteWithDetails {
    #[serde(flatten)]
    pub quote: Quote,
    pub event: EventWithOrganizer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    pub provider: UserPublic,
}

/// Flat ownership projection used by the transition/read authorization path.
///
/// The organizer who may act on a quote is the owner of its event, not a
/// field on the quote itself, so the read path joins through `event` once
/// and hands authorization this explicit projection.
#[derive(Debug, Clone)]
pub struct QuoteWithParties {
    pub quote: Quote,
    pub event_organizer_id: Uuid,
    pub venue_provider_id: Option<Uuid>,
}

impl QuoteWithParties {
    /// Whether `caller` may act on (transition or read) this quote.
    pub fn caller_may_act(&self, caller: &AuthUser) -> bool {
        match caller.role {
            Role::Admin => true,
            Role::Provider => caller.id == self.quote.provider_id,
            Role::Organizer => caller.id == self.event_organizer_id,
        }
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// A per-user inbox record, created as a side effect of other operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard cap on page size to bound result sets.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A page of results with the envelope the list endpoints return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl<T> Page<T> {
    /// Build a page from raw rows and a total count.
    pub fn new(items: Vec<T>, total_count: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total_count + limit - 1) / limit
        } else {
            0
        };
        Self {
            items,
            total_count,
            total_pages,
            current_page: page,
        }
    }

    /// An empty page (used e.g. for a provider with no venues).
    pub fn empty(page: i64) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: page,
        }
    }
}

/// Clamp raw pagination query values to sane bounds.
///
/// Returns `(page, limit, offset)` with page ≥ 1 and 1 ≤ limit ≤
/// [`MAX_PAGE_SIZE`].
pub fn clamp_pagination(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    // Query values are caller-controlled; the offset must not overflow.
    (page, limit, (page - 1).saturating_mul(limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Organizer, Role::Provider] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Organizer).unwrap(), "\"organizer\"");
        let parsed: Role = serde_json::from_str("\"provider\"").unwrap();
        assert_eq!(parsed, Role::Provider);
    }

    #[test]
    fn test_event_status_round_trip() {
        for status in [
            EventStatus::Draft,
            EventStatus::Planning,
            EventStatus::Confirmed,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(EventStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_quote_status_round_trip() {
        for status in [
            QuoteStatus::Draft,
            QuoteStatus::Sent,
            QuoteStatus::Accepted,
            QuoteStatus::Rejected,
            QuoteStatus::Expired,
            QuoteStatus::Negotiating,
        ] {
            assert_eq!(QuoteStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_quote_action_targets() {
        assert_eq!(QuoteAction::Accept.target_status(), QuoteStatus::Accepted);
        assert_eq!(QuoteAction::Reject.target_status(), QuoteStatus::Rejected);
        assert_eq!(
            QuoteAction::Negotiate.target_status(),
            QuoteStatus::Negotiating
        );
    }

    #[test]
    fn test_quote_items_preserve_order_through_serde() {
        let items = vec![
            QuoteItem {
                description: "Venue rental".into(),
                quantity: 1,
                unit_price: BigDecimal::from_str("450.00").unwrap(),
                total: Some(BigDecimal::from_str("450.00").unwrap()),
            },
            QuoteItem {
                description: "Catering".into(),
                quantity: 120,
                unit_price: BigDecimal::from_str("22.50").unwrap(),
                total: None,
            },
        ];
        let json = serde_json::to_string(&items).unwrap();
        let back: Vec<QuoteItem> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn test_caller_may_act_provider_and_organizer() {
        let provider_id = Uuid::now_v7();
        let organizer_id = Uuid::now_v7();
        let projection = QuoteWithParties {
            quote: Quote {
                id: Uuid::now_v7(),
                event_id: Uuid::now_v7(),
                venue_id: None,
                provider_id,
                items: vec![],
                subtotal: BigDecimal::from(100),
                vat: BigDecimal::from(0),
                total: BigDecimal::from(100),
                status: QuoteStatus::Draft,
                valid_until: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            event_organizer_id: organizer_id,
            venue_provider_id: None,
        };

        let issuing_provider = AuthUser {
            id: provider_id,
            role: Role::Provider,
        };
        let other_provider = AuthUser {
            id: Uuid::now_v7(),
            role: Role::Provider,
        };
        let owning_organizer = AuthUser {
            id: organizer_id,
            role: Role::Organizer,
        };
        let other_organizer = AuthUser {
            id: Uuid::now_v7(),
            role: Role::Organizer,
        };
        let admin = AuthUser {
            id: Uuid::now_v7(),
            role: Role::Admin,
        };

        assert!(projection.caller_may_act(&issuing_provider));
        assert!(!projection.caller_may_act(&other_provider));
        assert!(projection.caller_may_act(&owning_organizer));
        assert!(!projection.caller_may_act(&other_organizer));
        assert!(projection.caller_may_act(&admin));
    }

    #[test]
    fn test_clamp_pagination_defaults_and_bounds() {
        assert_eq!(clamp_pagination(None, None), (1, 10, 0));
        assert_eq!(clamp_pagination(Some(3), Some(20)), (3, 20, 40));
        assert_eq!(clamp_pagination(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(clamp_pagination(Some(2), Some(500)), (2, 100, 100));
    }

    #[test]
    fn test_clamp_pagination_extreme_page_saturates() {
        let (page, limit, offset) = clamp_pagination(Some(i64::MAX), Some(100));
        assert_eq!(page, i64::MAX);
        assert_eq!(limit, 100);
        assert_eq!(offset, i64::MAX);
        assert!(offset >= 0);
    }

    #[test]
    fn test_page_math() {
        let page: Page<i32> = Page::new(vec![1, 2, 3], 23, 1, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);

        let empty: Page<i32> = Page::empty(4);
        assert_eq!(empty.total_count, 0);
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.current_page, 4);
    }

    #[test]
    fn test_user_public_projection() {
        let user = User {
            id: Uuid::now_v7(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Organizer,
            phone: None,
            avatar: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let public = UserPublic::from(&user);
        assert_eq!(public.email, "ada@example.com");

        // The password hash must never serialize.
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("password"));
    }
}
