use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::messaging::{Conversation, ConversationView, Message};
use crate::middleware::response::PageRequest;

pub struct MessagingRepository {
    pool: PgPool,
}

impl MessagingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One conversation per parent/tutor pair; returns the existing row if present
    pub async fn open_conversation(&self, parent_id: Uuid, tutor_id: Uuid) -> Result<Conversation, DatabaseError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (id, parent_id, tutor_id) VALUES ($1, $2, $3)
             ON CONFLICT (parent_id, tutor_id) DO UPDATE SET parent_id = EXCLUDED.parent_id
             RETURNING id, parent_id, tutor_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(parent_id)
        .bind(tutor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(conversation)
    }

    pub async fn find_conversation(&self, id: Uuid) -> Result<Option<Conversation>, DatabaseError> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT id, parent_id, tutor_id, created_at FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(conversation)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<ConversationView>, DatabaseError> {
        let rows = sqlx::query_as::<_, ConversationView>(
            "SELECT c.id, c.parent_id, c.tutor_id,
                    u.full_name AS counterpart_name, u.image_url AS counterpart_image_url,
                    lm.content AS last_message, lm.created_at AS last_message_at,
                    (SELECT COUNT(*) FROM messages m
                     WHERE m.conversation_id = c.id AND m.sender_id <> $1 AND NOT m.is_read) AS unread_count
             FROM conversations c
             JOIN users u ON u.id = CASE WHEN c.parent_id = $1 THEN c.tutor_id ELSE c.parent_id END
             LEFT JOIN LATERAL (
                 SELECT content, created_at FROM messages m
                 WHERE m.conversation_id = c.id
                 ORDER BY created_at DESC LIMIT 1
             ) lm ON TRUE
             WHERE c.parent_id = $1 OR c.tutor_id = $1
             ORDER BY COALESCE(lm.created_at, c.created_at) DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message, DatabaseError> {
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, conversation_id, sender_id, content) VALUES ($1, $2, $3, $4)
             RETURNING id, conversation_id, sender_id, content, is_read, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }

    /// Newest first
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Message>, i64), DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, sender_id, content, is_read, created_at FROM messages
             WHERE conversation_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(conversation_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((messages, total))
    }

    /// Mark messages sent by the other participant as read
    pub async fn mark_read(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE
             WHERE conversation_id = $1 AND sender_id <> $2 AND NOT is_read",
        )
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
