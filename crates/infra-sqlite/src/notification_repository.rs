// SQLite NotificationRepository Implementation

use crate::error::{invalid_row, map_sqlx_error};
use async_trait::async_trait;
use sajilo_core::domain::{Notification, NotificationKind};
use sajilo_core::error::{AppError, Result};
use sajilo_core::port::NotificationRepository;
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn create_notification(&self, notification: &Notification) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (id, user_id, title, message, type, related_id, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(&notification.related_id)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_notification()
    }

    async fn get_notification(&self, id: &str) -> Result<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(NotificationRow::into_notification).transpose()
    }

    async fn get_notifications(&self, user_id: &str) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(NotificationRow::into_notification).collect()
    }

    async fn get_unread_count(&self, user_id: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn mark_notification_as_read(&self, id: &str) -> Result<Notification> {
        // Not guarded on is_read = 0: repeating the call returns the same row
        let row = sqlx::query_as::<_, NotificationRow>(
            "UPDATE notifications SET is_read = 1 WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?
            .into_notification()
    }

    async fn mark_all_as_read(&self, user_id: &str) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    title: String,
    message: String,
    #[sqlx(rename = "type")]
    kind: String,
    related_id: Option<String>,
    is_read: bool,
    created_at: i64,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification> {
        let kind = NotificationKind::from_str(&self.kind)
            .map_err(|e| invalid_row("notifications", &self.id, e))?;

        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message: self.message,
            kind,
            related_id: self.related_id,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}
