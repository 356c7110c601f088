//! Notification repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use eventra_core::{
    new_v7, CreateNotificationRequest, Error, Notification, NotificationRepository, Result,
};

/// PostgreSQL implementation of [`NotificationRepository`].
pub struct PgNotificationRepository {
    pool: Pool<Postgres>,
}

impl PgNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, is_read, related_entity_type, related_entity_id, \
     created_at";

fn map_notification_row(row: &PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        kind: row.get("kind"),
        is_read: row.get("is_read"),
        related_entity_type: row.get("related_entity_type"),
        related_entity_id: row.get("related_entity_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, req: CreateNotificationRequest) -> Result<Notification> {
        let row = sqlx::query(&format!(
            "INSERT INTO notification (id, user_id, title, message, kind, is_read,
                                       related_entity_type, related_entity_id, created_at)
             VALUES ($1, $2, $3, $4, $5, FALSE, $6, $7, $8)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(req.user_id)
        .bind(&req.title)
        .bind(&req.message)
        .bind(&req.kind)
        .bind(&req.related_entity_type)
        .bind(req.related_entity_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_notification_row(&row))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notification
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_notification_row).collect())
    }

    async fn mark_read(&self, user_id: Uuid, id: Uuid) -> Result<Notification> {
        let row = sqlx::query(&format!(
            "UPDATE notification SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound(format!("notification {id} not found")))?;

        Ok(map_notification_row(&row))
    }
}
