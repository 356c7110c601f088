//! End-to-end repository tests against a live PostgreSQL instance.
//!
//! Run with `cargo test -- --ignored` after starting a test database (see
//! `test_fixtures::DEFAULT_TEST_DATABASE_URL`).

use bigdecimal::BigDecimal;
use std::str::FromStr;

use eventra_core::{
    AuthUser, CreateQuoteRequest, CreateVenueRequest, Error, EventStatus, QuoteItem, QuoteStatus,
    Role, UpdateEventRequest, VenueListFilter,
};
use eventra_db::test_fixtures::TestDatabase;
use eventra_db::{
    EventRepository, QuoteRepository, SessionRepository, UserRepository, VenueRepository,
};

#[tokio::test]
#[ignore]
async fn draft_event_cannot_finalize_incomplete() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let organizer = t.seed_user(Role::Organizer).await.unwrap();
    let event = t
        .db
        .events
        .insert(
            organizer.id,
            eventra_core::CreateEventRequest {
                name: "Gala".into(),
                description: None,
                date: None,
                start_time: None,
                end_time: None,
                guest_count: None,
                budget: None,
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(event.status, EventStatus::Draft);

    let err = t
        .db
        .events
        .update(
            event.id,
            organizer.id,
            UpdateEventRequest {
                status: Some(EventStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // Nothing persisted.
    let unchanged = t.db.events.fetch(event.id).await.unwrap();
    assert_eq!(unchanged.event.status, EventStatus::Draft);
}

#[tokio::test]
#[ignore]
async fn quote_lifecycle_and_authorization_projection() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let organizer = t.seed_user(Role::Organizer).await.unwrap();
    let provider = t.seed_user(Role::Provider).await.unwrap();
    let event = t.seed_event(organizer.id).await.unwrap();
    let venue = t.seed_venue(provider.id, 200, "450.00").await.unwrap();

    let quote = t
        .db
        .quotes
        .insert(
            provider.id,
            CreateQuoteRequest {
                event_id: event.id,
                venue_id: Some(venue.id),
                items: vec![QuoteItem {
                    description: "Venue rental".into(),
                    quantity: 1,
                    unit_price: BigDecimal::from_str("450.00").unwrap(),
                    total: None,
                }],
                subtotal: BigDecimal::from_str("450.00").unwrap(),
                vat: Some(BigDecimal::from_str("67.50").unwrap()),
                total: BigDecimal::from_str("517.50").unwrap(),
                valid_until: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(quote.status, QuoteStatus::Draft);

    let parties = t.db.quotes.load_with_event_owner(quote.id).await.unwrap();
    assert_eq!(parties.event_organizer_id, organizer.id);
    assert_eq!(parties.venue_provider_id, Some(provider.id));
    assert!(parties.caller_may_act(&AuthUser {
        id: organizer.id,
        role: Role::Organizer
    }));
    assert!(!parties.caller_may_act(&AuthUser {
        id: eventra_core::new_v7(),
        role: Role::Provider
    }));

    let accepted = t
        .db
        .quotes
        .update_status(quote.id, QuoteStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, QuoteStatus::Accepted);

    // Detail shape carries event, venue and both parties.
    let details = t.db.quotes.fetch_details(quote.id).await.unwrap();
    assert_eq!(details.event.organizer.id, organizer.id);
    assert_eq!(details.venue.as_ref().map(|v| v.id), Some(venue.id));
    assert_eq!(details.provider.id, provider.id);
}

#[tokio::test]
#[ignore]
async fn quote_insert_rejects_missing_event() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();
    let provider = t.seed_user(Role::Provider).await.unwrap();

    let err = t
        .db
        .quotes
        .insert(
            provider.id,
            CreateQuoteRequest {
                event_id: eventra_core::new_v7(),
                venue_id: None,
                items: vec![QuoteItem {
                    description: "Catering".into(),
                    quantity: 10,
                    unit_price: BigDecimal::from(10),
                    total: None,
                }],
                subtotal: BigDecimal::from(100),
                vat: None,
                total: BigDecimal::from(100),
                valid_until: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

/// Minimal single-line quote against `event_id`, no VAT.
fn rental_quote(event_id: uuid::Uuid) -> CreateQuoteRequest {
    CreateQuoteRequest {
        event_id,
        venue_id: None,
        items: vec![QuoteItem {
            description: "Venue rental".into(),
            quantity: 1,
            unit_price: BigDecimal::from(100),
            total: None,
        }],
        subtotal: BigDecimal::from(100),
        vat: None,
        total: BigDecimal::from(100),
        valid_until: None,
    }
}

#[tokio::test]
#[ignore]
async fn organizer_quote_listing_is_scoped() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let organizer = t.seed_user(Role::Organizer).await.unwrap();
    let other_organizer = t.seed_user(Role::Organizer).await.unwrap();
    let provider = t.seed_user(Role::Provider).await.unwrap();
    let event = t.seed_event(organizer.id).await.unwrap();
    let other_event = t.seed_event(other_organizer.id).await.unwrap();

    t.db
        .quotes
        .insert(provider.id, rental_quote(event.id))
        .await
        .unwrap();
    t.db
        .quotes
        .insert(provider.id, rental_quote(other_event.id))
        .await
        .unwrap();

    // Each organizer sees exactly the quotes against their own events.
    let page = t.db.quotes.list_by_organizer(organizer.id, 1, 10).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].quote.event_id, event.id);
    assert_eq!(page.items[0].event.organizer.id, organizer.id);

    let other_page = t
        .db
        .quotes
        .list_by_organizer(other_organizer.id, 1, 10)
        .await
        .unwrap();
    assert_eq!(other_page.total_count, 1);
    assert_eq!(other_page.items[0].quote.event_id, other_event.id);
}

#[tokio::test]
#[ignore]
async fn venue_search_combines_term_and_city() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let provider = t.seed_user(Role::Provider).await.unwrap();
    t.db
        .venues
        .insert(
            provider.id,
            CreateVenueRequest {
                name: "Garden Pavilion".into(),
                description: Some("Open-air garden venue with a lake view".into()),
                address: "12 Park Lane".into(),
                city: "Greenfield".into(),
                capacity: 150,
                price_per_day: BigDecimal::from_str("300.00").unwrap(),
                amenities: None,
                images: Vec::new(),
            },
        )
        .await
        .unwrap();

    let hits = t
        .db
        .venues
        .search("garden", VenueListFilter::default())
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].venue.name, "Garden Pavilion");

    // The city filter ANDs with the free-text term.
    let elsewhere = t
        .db
        .venues
        .search(
            "garden",
            VenueListFilter {
                city: Some("Lakeside".into()),
                min_capacity: None,
                max_price: None,
            },
        )
        .await
        .unwrap();
    assert!(elsewhere.is_empty());
}

#[tokio::test]
#[ignore]
async fn venue_search_escapes_wildcards_and_filters() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let provider = t.seed_user(Role::Provider).await.unwrap();
    t.seed_venue(provider.id, 50, "100.00").await.unwrap();
    t.seed_venue(provider.id, 500, "900.00").await.unwrap();

    // Literal percent must not act as a wildcard.
    let hits = t
        .db
        .venues
        .search("100%", VenueListFilter::default())
        .await
        .unwrap();
    assert!(hits.is_empty());

    let filtered = t
        .db
        .venues
        .list_all(
            VenueListFilter {
                city: None,
                min_capacity: Some(100),
                max_price: None,
            },
            1,
            10,
        )
        .await
        .unwrap();
    assert_eq!(filtered.total_count, 1);
    assert_eq!(filtered.items[0].venue.capacity, 500);

    // Cheapest-first ordering for the planner's candidate set.
    let candidates = t.db.venues.candidates(None, None, 10).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert!(candidates[0].price_per_day <= candidates[1].price_per_day);
}

#[tokio::test]
#[ignore]
async fn session_tokens_resolve_roles_and_expire() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let admin = t.seed_user(Role::Admin).await.unwrap();
    let token = t.db.sessions.create(admin.id, 3600).await.unwrap();
    assert!(token.starts_with("ev_at_"));

    let auth = t.db.sessions.validate(&token).await.unwrap().unwrap();
    assert_eq!(auth.id, admin.id);
    assert_eq!(auth.role, Role::Admin);

    // Expired tokens validate to None and prune cleans them up.
    let expired = t.db.sessions.create(admin.id, -1).await.unwrap();
    assert!(t.db.sessions.validate(&expired).await.unwrap().is_none());
    assert!(t.db.sessions.prune_expired().await.unwrap() >= 1);
}

#[tokio::test]
#[ignore]
async fn duplicate_email_is_a_conflict() {
    let t = TestDatabase::new().await.unwrap();
    t.reset().await.unwrap();

    let user = t.seed_user(Role::Organizer).await.unwrap();
    let err = t
        .db
        .users
        .insert(eventra_core::CreateUserRecord {
            first_name: "Dup".into(),
            last_name: "User".into(),
            email: user.email.clone(),
            password_hash: "0".repeat(64),
            role: Role::Organizer,
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}
