//! Venue repository implementation.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{
    new_v7, validation, CreateVenueRequest, Error, Page, Result, UpdateVenueRequest, UserPublic,
    Venue, VenueListFilter, VenueRepository, VenueWithProvider, VENUE_SEARCH_LIMIT,
};

use crate::escape_like;

/// PostgreSQL implementation of [`VenueRepository`].
pub struct PgVenueRepository {
    pool: Pool<Postgres>,
}

impl PgVenueRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const VENUE_COLUMNS: &str =
    "v.id, v.name, v.description, v.address, v.city, v.capacity, v.price_per_day, v.amenities, \
     v.images, v.provider_id, v.created_at, v.updated_at";

const PROVIDER_COLUMNS: &str =
    "u.id AS provider_user_id, u.first_name AS provider_first_name, \
     u.last_name AS provider_last_name, u.email AS provider_email";

pub(crate) fn map_venue_row(row: &PgRow) -> Result<Venue> {
    let images: serde_json::Value = row.get("images");
    let images: Vec<String> = serde_json::from_value(images)
        .map_err(|e| Error::Serialization(format!("venue images column: {e}")))?;
    Ok(Venue {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        address: row.get("address"),
        city: row.get("city"),
        capacity: row.get("capacity"),
        price_per_day: row.get("price_per_day"),
        amenities: row.get("amenities"),
        images,
        provider_id: row.get("provider_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_venue_with_provider_row(row: &PgRow) -> Result<VenueWithProvider> {
    Ok(VenueWithProvider {
        venue: map_venue_row(row)?,
        provider: UserPublic {
            id: row.get("provider_user_id"),
            first_name: row.get("provider_first_name"),
            last_name: row.get("provider_last_name"),
            email: row.get("provider_email"),
        },
    })
}

fn validate_create(req: &CreateVenueRequest) -> Result<()> {
    validation::validate_entity_name("name", &req.name)?;
    validation::validate_capacity(req.capacity)?;
    validation::validate_price("price_per_day", &req.price_per_day)?;
    if req.address.trim().is_empty() {
        return Err(Error::Validation("address must not be empty".to_string()));
    }
    if req.city.trim().is_empty() {
        return Err(Error::Validation("city must not be empty".to_string()));
    }
    Ok(())
}

fn validate_patch(patch: &UpdateVenueRequest) -> Result<()> {
    if let Some(name) = &patch.name {
        validation::validate_entity_name("name", name)?;
    }
    if let Some(capacity) = patch.capacity {
        validation::validate_capacity(capacity)?;
    }
    if let Some(price) = &patch.price_per_day {
        validation::validate_price("price_per_day", price)?;
    }
    Ok(())
}

/// Append filter predicates to a WHERE clause, returning the next parameter
/// index. Binding order must match: city, min_capacity, max_price.
fn push_filter_clauses(clause: &mut String, filter: &VenueListFilter, mut param_idx: usize) -> usize {
    if filter.city.is_some() {
        clause.push_str(&format!(
            "AND v.city ILIKE '%' || ${param_idx} || '%' ESCAPE '\\' "
        ));
        param_idx += 1;
    }
    if filter.min_capacity.is_some() {
        clause.push_str(&format!("AND v.capacity >= ${param_idx} "));
        param_idx += 1;
    }
    if filter.max_price.is_some() {
        clause.push_str(&format!("AND v.price_per_day <= ${param_idx} "));
        param_idx += 1;
    }
    param_idx
}

macro_rules! bind_filter_params {
    ($query:expr, $filter:expr) => {{
        let mut q = $query;
        if let Some(city) = &$filter.city {
            q = q.bind(escape_like(city));
        }
        if let Some(min_capacity) = $filter.min_capacity {
            q = q.bind(min_capacity);
        }
        if let Some(max_price) = &$filter.max_price {
            q = q.bind(max_price.clone());
        }
        q
    }};
}

#[async_trait]
impl VenueRepository for PgVenueRepository {
    async fn insert(&self, provider_id: Uuid, req: CreateVenueRequest) -> Result<Venue> {
        validate_create(&req)?;
        let id = new_v7();
        let now = Utc::now();
        let images = serde_json::to_value(&req.images)?;

        let row = sqlx::query(&format!(
            "INSERT INTO venue (id, name, description, address, city, capacity, price_per_day,
                                amenities, images, provider_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {}",
            VENUE_COLUMNS.replace("v.", "")
        ))
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.address)
        .bind(&req.city)
        .bind(req.capacity)
        .bind(&req.price_per_day)
        .bind(&req.amenities)
        .bind(images)
        .bind(provider_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_venue_row(&row)
    }

    async fn list_for_provider(
        &self,
        provider_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<VenueWithProvider>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM venue WHERE provider_id = $1")
            .bind(provider_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {VENUE_COLUMNS}, {PROVIDER_COLUMNS}
             FROM venue v
             JOIN app_user u ON u.id = v.provider_id
             WHERE v.provider_id = $1
             ORDER BY v.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(provider_id)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(map_venue_with_provider_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn list_all(
        &self,
        filter: VenueListFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<VenueWithProvider>> {
        let mut where_clause = String::from("WHERE 1=1 ");
        let param_idx = push_filter_clauses(&mut where_clause, &filter, 1);

        let count_query = format!("SELECT COUNT(*) FROM venue v {where_clause}");
        let count_q = bind_filter_params!(sqlx::query_scalar::<_, i64>(&count_query), filter);
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_query = format!(
            "SELECT {VENUE_COLUMNS}, {PROVIDER_COLUMNS}
             FROM venue v
             JOIN app_user u ON u.id = v.provider_id
             {where_clause}
             ORDER BY v.price_per_day ASC
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );
        let q = bind_filter_params!(sqlx::query(&list_query), filter);
        let rows = q
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(map_venue_with_provider_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn search(&self, term: &str, filter: VenueListFilter) -> Result<Vec<VenueWithProvider>> {
        let mut where_clause = String::from(
            "WHERE (v.name ILIKE $1 ESCAPE '\\' OR v.description ILIKE $1 ESCAPE '\\' \
             OR v.city ILIKE $1 ESCAPE '\\' OR v.amenities ILIKE $1 ESCAPE '\\') ",
        );
        let param_idx = push_filter_clauses(&mut where_clause, &filter, 2);

        let query = format!(
            "SELECT {VENUE_COLUMNS}, {PROVIDER_COLUMNS}
             FROM venue v
             JOIN app_user u ON u.id = v.provider_id
             {where_clause}
             ORDER BY v.price_per_day ASC
             LIMIT ${param_idx}"
        );

        let pattern = format!("%{}%", escape_like(term));
        let q = bind_filter_params!(sqlx::query(&query).bind(pattern), filter);
        let rows = q
            .bind(VENUE_SEARCH_LIMIT)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(map_venue_with_provider_row).collect()
    }

    async fn fetch(&self, id: Uuid) -> Result<VenueWithProvider> {
        let row = sqlx::query(&format!(
            "SELECT {VENUE_COLUMNS}, {PROVIDER_COLUMNS}
             FROM venue v
             JOIN app_user u ON u.id = v.provider_id
             WHERE v.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("venue {id} not found")))?;

        map_venue_with_provider_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        provider_id: Uuid,
        patch: UpdateVenueRequest,
    ) -> Result<Venue> {
        validate_patch(&patch)?;

        // $1 = now, $2 = id, $3 = provider_id, dynamic params start at $4
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let mut param_idx = 4;
        macro_rules! push_update {
            ($field:expr, $column:expr) => {
                if $field.is_some() {
                    updates.push(format!(concat!($column, " = ${}"), param_idx));
                    param_idx += 1;
                }
            };
        }
        push_update!(patch.name, "name");
        push_update!(patch.description, "description");
        push_update!(patch.address, "address");
        push_update!(patch.city, "city");
        push_update!(patch.capacity, "capacity");
        push_update!(patch.price_per_day, "price_per_day");
        push_update!(patch.amenities, "amenities");
        if patch.images.is_some() {
            updates.push(format!("images = ${param_idx}"));
        }

        let query = format!(
            "UPDATE venue SET {} WHERE id = $2 AND provider_id = $3 RETURNING {}",
            updates.join(", "),
            VENUE_COLUMNS.replace("v.", "")
        );

        let mut q = sqlx::query(&query).bind(Utc::now()).bind(id).bind(provider_id);
        if let Some(name) = &patch.name {
            q = q.bind(name);
        }
        if let Some(description) = &patch.description {
            q = q.bind(description);
        }
        if let Some(address) = &patch.address {
            q = q.bind(address);
        }
        if let Some(city) = &patch.city {
            q = q.bind(city);
        }
        if let Some(capacity) = patch.capacity {
            q = q.bind(capacity);
        }
        if let Some(price) = &patch.price_per_day {
            q = q.bind(price);
        }
        if let Some(amenities) = &patch.amenities {
            q = q.bind(amenities);
        }
        if let Some(images) = &patch.images {
            q = q.bind(serde_json::to_value(images)?);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound("venue not found or not authorized".to_string()))?;

        map_venue_row(&row)
    }

    async fn delete(&self, id: Uuid, provider_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM venue WHERE id = $1 AND provider_id = $2")
            .bind(id)
            .bind(provider_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "venue not found or not authorized".to_string(),
            ));
        }
        Ok(())
    }

    async fn candidates(
        &self,
        min_capacity: Option<i32>,
        max_price: Option<BigDecimal>,
        limit: i64,
    ) -> Result<Vec<Venue>> {
        let filter = VenueListFilter {
            city: None,
            min_capacity,
            max_price,
        };
        let mut where_clause = String::from("WHERE 1=1 ");
        let param_idx = push_filter_clauses(&mut where_clause, &filter, 1);

        let query = format!(
            "SELECT {VENUE_COLUMNS}
             FROM venue v
             {where_clause}
             ORDER BY v.price_per_day ASC
             LIMIT ${param_idx}"
        );
        let q = bind_filter_params!(sqlx::query(&query), filter);
        let rows = q
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.iter().map(map_venue_row).collect()
    }

    async fn cheapest(&self, limit: i64) -> Result<Vec<Venue>> {
        let rows = sqlx::query(&format!(
            "SELECT {VENUE_COLUMNS}
             FROM venue v
             ORDER BY v.price_per_day ASC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(map_venue_row).collect()
    }
}
