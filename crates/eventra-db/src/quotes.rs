//! Quote repository implementation.
//!
//! The detail shape joins event, organizer, venue and issuing provider in
//! one query. The venue join is LEFT because a quote may precede venue
//! selection and survives venue deletion (`ON DELETE SET NULL`).

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{
    new_v7, validation, CreateQuoteRequest, Error, Event, EventStatus, EventWithOrganizer, Page,
    Quote, QuoteItem, QuoteRepository, QuoteStatus, QuoteWithDetails, QuoteWithParties, Result,
    UserPublic, Venue,
};

/// PostgreSQL implementation of [`QuoteRepository`].
pub struct PgQuoteRepository {
    pool: Pool<Postgres>,
}

impl PgQuoteRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const QUOTE_COLUMNS: &str =
    "q.id, q.event_id, q.venue_id, q.provider_id, q.items, q.subtotal, q.vat, q.total, \
     q.status::text AS status, q.valid_until, q.created_at, q.updated_at";

const DETAIL_COLUMNS: &str = "e.id AS e_id, e.name AS e_name, e.description AS e_description, \
     e.date AS e_date, e.start_time AS e_start_time, e.end_time AS e_end_time, \
     e.guest_count AS e_guest_count, e.budget AS e_budget, e.status::text AS e_status, \
     e.organizer_id AS e_organizer_id, e.created_at AS e_created_at, e.updated_at AS e_updated_at, \
     ou.id AS organizer_user_id, ou.first_name AS organizer_first_name, \
     ou.last_name AS organizer_last_name, ou.email AS organizer_email, \
     v.id AS v_id, v.name AS v_name, v.description AS v_description, v.address AS v_address, \
     v.city AS v_city, v.capacity AS v_capacity, v.price_per_day AS v_price_per_day, \
     v.amenities AS v_amenities, v.images AS v_images, v.provider_id AS v_provider_id, \
     v.created_at AS v_created_at, v.updated_at AS v_updated_at, \
     pu.id AS provider_user_id, pu.first_name AS provider_first_name, \
     pu.last_name AS provider_last_name, pu.email AS provider_email";

const DETAIL_JOINS: &str = "FROM quote q \
     JOIN event e ON e.id = q.event_id \
     JOIN app_user ou ON ou.id = e.organizer_id \
     LEFT JOIN venue v ON v.id = q.venue_id \
     JOIN app_user pu ON pu.id = q.provider_id";

fn map_quote_row(row: &PgRow) -> Result<Quote> {
    let status: String = row.get("status");
    let items: serde_json::Value = row.get("items");
    let items: Vec<QuoteItem> = serde_json::from_value(items)
        .map_err(|e| Error::Serialization(format!("quote items column: {e}")))?;
    Ok(Quote {
        id: row.get("id"),
        event_id: row.get("event_id"),
        venue_id: row.get("venue_id"),
        provider_id: row.get("provider_id"),
        items,
        subtotal: row.get("subtotal"),
        vat: row.get("vat"),
        total: row.get("total"),
        status: status.parse::<QuoteStatus>()?,
        valid_until: row.get("valid_until"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_detail_row(row: &PgRow) -> Result<QuoteWithDetails> {
    let quote = map_quote_row(row)?;

    let event_status: String = row.get("e_status");
    let event = Event {
        id: row.get("e_id"),
        name: row.get("e_name"),
        description: row.get("e_description"),
        date: row.get("e_date"),
        start_time: row.get("e_start_time"),
        end_time: row.get("e_end_time"),
        guest_count: row.get("e_guest_count"),
        budget: row.get("e_budget"),
        status: event_status.parse::<EventStatus>()?,
        organizer_id: row.get("e_organizer_id"),
        created_at: row.get("e_created_at"),
        updated_at: row.get("e_updated_at"),
    };
    let organizer = UserPublic {
        id: row.get("organizer_user_id"),
        first_name: row.get("organizer_first_name"),
        last_name: row.get("organizer_last_name"),
        email: row.get("organizer_email"),
    };

    let venue_id: Option<Uuid> = row.get("v_id");
    let venue = match venue_id {
        Some(id) => {
            let images: serde_json::Value = row.get("v_images");
            let images: Vec<String> = serde_json::from_value(images)
                .map_err(|e| Error::Serialization(format!("venue images column: {e}")))?;
            Some(Venue {
                id,
                name: row.get("v_name"),
                description: row.get("v_description"),
                address: row.get("v_address"),
                city: row.get("v_city"),
                capacity: row.get("v_capacity"),
                price_per_day: row.get("v_price_per_day"),
                amenities: row.get("v_amenities"),
                images,
                provider_id: row.get("v_provider_id"),
                created_at: row.get("v_created_at"),
                updated_at: row.get("v_updated_at"),
            })
        }
        None => None,
    };

    Ok(QuoteWithDetails {
        quote,
        event: EventWithOrganizer { event, organizer },
        venue,
        provider: UserPublic {
            id: row.get("provider_user_id"),
            first_name: row.get("provider_first_name"),
            last_name: row.get("provider_last_name"),
            email: row.get("provider_email"),
        },
    })
}

fn validate_create(req: &CreateQuoteRequest) -> Result<()> {
    if req.items.is_empty() {
        return Err(Error::Validation(
            "a quote must contain at least one item".to_string(),
        ));
    }
    for (i, item) in req.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            return Err(Error::Validation(format!(
                "item {i}: description must not be empty"
            )));
        }
        if item.quantity < 1 {
            return Err(Error::Validation(format!(
                "item {i}: quantity must be at least 1"
            )));
        }
        validation::validate_price("unit_price", &item.unit_price)?;
    }
    validation::validate_price("subtotal", &req.subtotal)?;
    validation::validate_price("total", &req.total)?;
    let vat = req.vat.clone().unwrap_or_else(|| BigDecimal::from(0));
    validation::validate_price("vat", &vat)?;
    if req.subtotal.clone() + vat != req.total {
        return Err(Error::Validation(
            "total must equal subtotal plus vat".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl QuoteRepository for PgQuoteRepository {
    async fn insert(&self, provider_id: Uuid, req: CreateQuoteRequest) -> Result<Quote> {
        validate_create(&req)?;

        // Surface missing parents as NotFound instead of a FK violation.
        let event_exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM event WHERE id = $1")
            .bind(req.event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        if event_exists.is_none() {
            return Err(Error::NotFound(format!("event {} not found", req.event_id)));
        }
        if let Some(venue_id) = req.venue_id {
            let venue_exists: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM venue WHERE id = $1")
                    .bind(venue_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(Error::Database)?;
            if venue_exists.is_none() {
                return Err(Error::NotFound(format!("venue {venue_id} not found")));
            }
        }

        let id = new_v7();
        let now = Utc::now();
        let vat = req.vat.clone().unwrap_or_else(|| BigDecimal::from(0));
        let items = serde_json::to_value(&req.items)?;

        let row = sqlx::query(&format!(
            "INSERT INTO quote (id, event_id, venue_id, provider_id, items, subtotal, vat, total,
                                status, valid_until, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::quote_status, $10, $11, $11)
             RETURNING {}",
            QUOTE_COLUMNS.replace("q.", "")
        ))
        .bind(id)
        .bind(req.event_id)
        .bind(req.venue_id)
        .bind(provider_id)
        .bind(items)
        .bind(&req.subtotal)
        .bind(&vat)
        .bind(&req.total)
        .bind(QuoteStatus::Draft.as_str())
        .bind(req.valid_until)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_quote_row(&row)
    }

    async fn list_by_provider(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quote WHERE provider_id = $1")
            .bind(provider_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE q.provider_id = $1
             ORDER BY q.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(provider_id)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows.iter().map(map_detail_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn list_by_organizer(
        &self,
        organizer_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quote q JOIN event e ON e.id = q.event_id
             WHERE e.organizer_id = $1",
        )
        .bind(organizer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE e.organizer_id = $1
             ORDER BY q.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(organizer_id)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows.iter().map(map_detail_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<QuoteWithDetails>> {
        let rows = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE q.event_id = $1
             ORDER BY q.created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_detail_row).collect()
    }

    async fn list_for_provider_venues(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<QuoteWithDetails>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quote q JOIN venue v ON v.id = q.venue_id
             WHERE v.provider_id = $1",
        )
        .bind(provider_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE v.provider_id = $1
             ORDER BY q.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(provider_id)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows.iter().map(map_detail_row).collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn load_with_event_owner(&self, id: Uuid) -> Result<QuoteWithParties> {
        let row = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, e.organizer_id AS event_organizer_id,
                    v.provider_id AS venue_provider_id
             FROM quote q
             JOIN event e ON e.id = q.event_id
             LEFT JOIN venue v ON v.id = q.venue_id
             WHERE q.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("quote {id} not found")))?;

        Ok(QuoteWithParties {
            quote: map_quote_row(&row)?,
            event_organizer_id: row.get("event_organizer_id"),
            venue_provider_id: row.get("venue_provider_id"),
        })
    }

    async fn update_status(&self, id: Uuid, status: QuoteStatus) -> Result<Quote> {
        let row = sqlx::query(&format!(
            "UPDATE quote SET status = $3::quote_status, updated_at = $1
             WHERE id = $2
             RETURNING {}",
            QUOTE_COLUMNS.replace("q.", "")
        ))
        .bind(Utc::now())
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("quote {id} not found")))?;

        map_quote_row(&row)
    }

    async fn fetch_details(&self, id: Uuid) -> Result<QuoteWithDetails> {
        let row = sqlx::query(&format!(
            "SELECT {QUOTE_COLUMNS}, {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE q.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("quote {id} not found")))?;

        map_detail_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn request(subtotal: &str, vat: Option<&str>, total: &str) -> CreateQuoteRequest {
        CreateQuoteRequest {
            event_id: new_v7(),
            venue_id: None,
            items: vec![QuoteItem {
                description: "Venue rental".into(),
                quantity: 1,
                unit_price: BigDecimal::from_str(subtotal).unwrap(),
                total: None,
            }],
            subtotal: BigDecimal::from_str(subtotal).unwrap(),
            vat: vat.map(|v| BigDecimal::from_str(v).unwrap()),
            total: BigDecimal::from_str(total).unwrap(),
            valid_until: None,
        }
    }

    #[test]
    fn test_totals_must_reconcile() {
        assert!(validate_create(&request("100.00", Some("15.00"), "115.00")).is_ok());
        assert!(validate_create(&request("100.00", Some("15.00"), "114.99")).is_err());
        // Absent vat defaults to zero.
        assert!(validate_create(&request("100.00", None, "100.00")).is_ok());
        assert!(validate_create(&request("100.00", None, "115.00")).is_err());
    }

    #[test]
    fn test_items_are_required() {
        let mut req = request("100.00", None, "100.00");
        req.items.clear();
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_item_fields_are_checked() {
        let mut req = request("100.00", None, "100.00");
        req.items[0].quantity = 0;
        assert!(validate_create(&req).is_err());

        let mut req = request("100.00", None, "100.00");
        req.items[0].description = "  ".into();
        assert!(validate_create(&req).is_err());
    }
}
