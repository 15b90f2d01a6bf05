use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::notification::Notification;
use crate::middleware::response::PageRequest;

pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        receiver_id: Uuid,
        description: &str,
        url_detail: Option<&str>,
    ) -> Result<Notification, DatabaseError> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, receiver_id, description, url_detail) VALUES ($1, $2, $3, $4)
             RETURNING id, receiver_id, description, url_detail, is_read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(receiver_id)
        .bind(description)
        .bind(url_detail)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    pub async fn list_for(&self, receiver_id: Uuid, page: PageRequest) -> Result<(Vec<Notification>, i64), DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE receiver_id = $1")
            .bind(receiver_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Notification>(
            "SELECT id, receiver_id, description, url_detail, is_read, created_at FROM notifications
             WHERE receiver_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(receiver_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn unread_count(&self, receiver_id: Uuid) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND NOT is_read")
            .bind(receiver_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Only the receiver can mark a notification read
    pub async fn mark_read(&self, id: Uuid, receiver_id: Uuid) -> Result<Notification, DatabaseError> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND receiver_id = $2
             RETURNING id, receiver_id, description, url_detail, is_read, created_at",
        )
        .bind(id)
        .bind(receiver_id)
        .fetch_optional(&self.pool)
        .await?;
        notification.ok_or_else(|| DatabaseError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, receiver_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE receiver_id = $1 AND NOT is_read")
            .bind(receiver_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
