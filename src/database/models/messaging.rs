use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub tutor_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.parent_id == user_id || self.tutor_id == user_id
    }

    /// The participant that is not `user_id`
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.parent_id == user_id {
            self.tutor_id
        } else {
            self.parent_id
        }
    }
}

/// Conversation list entry with the other participant and last message
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub tutor_id: Uuid,
    pub counterpart_name: String,
    pub counterpart_image_url: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_is_the_other_side() {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            parent_id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert_eq!(conversation.counterpart(conversation.parent_id), conversation.tutor_id);
        assert_eq!(conversation.counterpart(conversation.tutor_id), conversation.parent_id);
        assert!(!conversation.has_participant(Uuid::new_v4()));
    }
}
