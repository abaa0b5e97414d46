//! Notification repository for database operations

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::{NewNotification, Notification, NotificationStatus, NotificationType};

fn map_notification(row: &PgRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        message: row.get("message"),
        notification_type: NotificationType::from_string(
            row.get::<String, _>("notification_type").as_str(),
        ),
        status: NotificationStatus::from_string(row.get::<String, _>("status").as_str()),
        read_at: row.get("read_at"),
        created_at: row.get("created_at"),
    }
}

/// Notification repository
#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a notification to a user's inbox
    pub async fn create(&self, new_notification: &NewNotification) -> Result<Notification> {
        let row = sqlx::query(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, message, notification_type, status, read_at, created_at
            "#,
        )
        .bind(new_notification.user_id)
        .bind(&new_notification.title)
        .bind(&new_notification.message)
        .bind(new_notification.notification_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_notification(&row))
    }

    /// List a user's notifications, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, message, notification_type, status, read_at, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_notification).collect())
    }

    /// Count a user's unread notifications
    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let row = sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'read', read_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, message, notification_type, status, read_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_notification))
    }

    /// Mark all of the user's unread notifications read
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET status = 'read', read_at = NOW()
            WHERE user_id = $1 AND status = 'unread'
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
