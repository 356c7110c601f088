//! Event repository implementation.
//!
//! Ownership is enforced in the query (`WHERE id = $1 AND organizer_id = $2`)
//! so a foreign event is indistinguishable from a missing one. The
//! draft → non-draft completeness rule runs inside a transaction with the
//! current row locked, closing the read-check-write race.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{
    new_v7, validation, CreateEventRequest, Error, Event, EventListFilter, EventRepository,
    EventStatus, EventWithOrganizer, Page, Result, UpdateEventRequest, UserPublic,
};

/// PostgreSQL implementation of [`EventRepository`].
pub struct PgEventRepository {
    pool: Pool<Postgres>,
}

impl PgEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const EVENT_COLUMNS: &str =
    "e.id, e.name, e.description, e.date, e.start_time, e.end_time, e.guest_count, e.budget, \
     e.status::text AS status, e.organizer_id, e.created_at, e.updated_at";

const ORGANIZER_COLUMNS: &str =
    "u.id AS organizer_user_id, u.first_name AS organizer_first_name, \
     u.last_name AS organizer_last_name, u.email AS organizer_email";

pub(crate) fn map_event_row(row: &PgRow) -> Result<Event> {
    let status: String = row.get("status");
    Ok(Event {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        date: row.get("date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        guest_count: row.get("guest_count"),
        budget: row.get("budget"),
        status: status.parse::<EventStatus>()?,
        organizer_id: row.get("organizer_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

pub(crate) fn map_event_with_organizer_row(row: &PgRow) -> Result<EventWithOrganizer> {
    Ok(EventWithOrganizer {
        event: map_event_row(row)?,
        organizer: UserPublic {
            id: row.get("organizer_user_id"),
            first_name: row.get("organizer_first_name"),
            last_name: row.get("organizer_last_name"),
            email: row.get("organizer_email"),
        },
    })
}

fn validate_create(req: &CreateEventRequest) -> Result<()> {
    validation::validate_entity_name("name", &req.name)?;
    if let Some(guest_count) = req.guest_count {
        validation::validate_guest_count(guest_count)?;
    }
    if let Some(budget) = &req.budget {
        validation::validate_budget(budget)?;
    }
    Ok(())
}

fn validate_patch(patch: &UpdateEventRequest) -> Result<()> {
    if let Some(name) = &patch.name {
        validation::validate_entity_name("name", name)?;
    }
    if let Some(guest_count) = patch.guest_count {
        validation::validate_guest_count(guest_count)?;
    }
    if let Some(budget) = &patch.budget {
        validation::validate_budget(budget)?;
    }
    Ok(())
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn insert(&self, organizer_id: Uuid, req: CreateEventRequest) -> Result<Event> {
        validate_create(&req)?;
        let id = new_v7();
        let now = Utc::now();
        let status = req.status.unwrap_or(EventStatus::Draft);

        let row = sqlx::query(&format!(
            "INSERT INTO event (id, name, description, date, start_time, end_time, guest_count,
                                budget, status, organizer_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::event_status, $10, $11, $11)
             RETURNING {}",
            EVENT_COLUMNS.replace("e.", "")
        ))
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.date)
        .bind(req.start_time)
        .bind(req.end_time)
        .bind(req.guest_count)
        .bind(&req.budget)
        .bind(status.as_str())
        .bind(organizer_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        map_event_row(&row)
    }

    async fn list_for_organizer(
        &self,
        organizer_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Page<EventWithOrganizer>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event WHERE organizer_id = $1")
            .bind(organizer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS}, {ORGANIZER_COLUMNS}
             FROM event e
             JOIN app_user u ON u.id = e.organizer_id
             WHERE e.organizer_id = $1
             ORDER BY e.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(organizer_id)
        .bind(limit)
        .bind((page - 1) * limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(map_event_with_organizer_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn list_all(
        &self,
        filter: EventListFilter,
        page: i64,
        limit: i64,
    ) -> Result<Page<EventWithOrganizer>> {
        let mut where_clause = String::from("WHERE 1=1 ");
        let mut param_idx = 1;
        if filter.status.is_some() {
            where_clause.push_str(&format!("AND e.status = ${param_idx}::event_status "));
            param_idx += 1;
        }
        if filter.date_from.is_some() {
            where_clause.push_str(&format!("AND e.date >= ${param_idx} "));
            param_idx += 1;
        }
        if filter.date_to.is_some() {
            where_clause.push_str(&format!("AND e.date <= ${param_idx} "));
            param_idx += 1;
        }

        let count_query = format!("SELECT COUNT(*) FROM event e {where_clause}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(status) = filter.status {
            count_q = count_q.bind(status.as_str());
        }
        if let Some(date_from) = filter.date_from {
            count_q = count_q.bind(date_from);
        }
        if let Some(date_to) = filter.date_to {
            count_q = count_q.bind(date_to);
        }
        let total = count_q.fetch_one(&self.pool).await.map_err(Error::Database)?;

        let list_query = format!(
            "SELECT {EVENT_COLUMNS}, {ORGANIZER_COLUMNS}
             FROM event e
             JOIN app_user u ON u.id = e.organizer_id
             {where_clause}
             ORDER BY e.created_at DESC
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );
        let mut q = sqlx::query(&list_query);
        if let Some(status) = filter.status {
            q = q.bind(status.as_str());
        }
        if let Some(date_from) = filter.date_from {
            q = q.bind(date_from);
        }
        if let Some(date_to) = filter.date_to {
            q = q.bind(date_to);
        }
        let rows = q
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(map_event_with_organizer_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, total, page, limit))
    }

    async fn fetch(&self, id: Uuid) -> Result<EventWithOrganizer> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS}, {ORGANIZER_COLUMNS}
             FROM event e
             JOIN app_user u ON u.id = e.organizer_id
             WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("event {id} not found")))?;

        map_event_with_organizer_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        organizer_id: Uuid,
        patch: UpdateEventRequest,
    ) -> Result<Event> {
        validate_patch(&patch)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query(&format!(
            "SELECT {} FROM event e WHERE e.id = $1 AND e.organizer_id = $2 FOR UPDATE",
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(organizer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("event not found or not authorized".to_string()))?;

        let current = map_event_row(&row)?;

        // Completeness rule: leaving draft requires every scheduling field
        // to have an effective value. Nothing persists on violation.
        if patch.finalizes(&current) {
            let missing = patch.missing_finalize_fields(&current);
            if !missing.is_empty() {
                return Err(Error::missing_event_fields(&missing));
            }
        }

        // $1 = now, $2 = id, dynamic params start at $3
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let mut param_idx = 3;
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
        push_update!(patch.date, "date");
        push_update!(patch.start_time, "start_time");
        push_update!(patch.end_time, "end_time");
        push_update!(patch.guest_count, "guest_count");
        push_update!(patch.budget, "budget");
        if patch.status.is_some() {
            updates.push(format!("status = ${param_idx}::event_status"));
        }

        let query = format!(
            "UPDATE event SET {} WHERE id = $2 RETURNING {}",
            updates.join(", "),
            EVENT_COLUMNS.replace("e.", "")
        );

        let mut q = sqlx::query(&query).bind(Utc::now()).bind(id);
        if let Some(name) = &patch.name {
            q = q.bind(name);
        }
        if let Some(description) = &patch.description {
            q = q.bind(description);
        }
        if let Some(date) = patch.date {
            q = q.bind(date);
        }
        if let Some(start_time) = patch.start_time {
            q = q.bind(start_time);
        }
        if let Some(end_time) = patch.end_time {
            q = q.bind(end_time);
        }
        if let Some(guest_count) = patch.guest_count {
            q = q.bind(guest_count);
        }
        if let Some(budget) = &patch.budget {
            q = q.bind(budget);
        }
        if let Some(status) = patch.status {
            q = q.bind(status.as_str());
        }

        let row = q.fetch_one(&mut *tx).await.map_err(Error::Database)?;
        tx.commit().await.map_err(Error::Database)?;

        map_event_row(&row)
    }

    async fn delete(&self, id: Uuid, organizer_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM event WHERE id = $1 AND organizer_id = $2")
            .bind(id)
            .bind(organizer_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "event not found or not authorized".to_string(),
            ));
        }
        Ok(())
    }
}
