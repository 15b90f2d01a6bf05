use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub receiver_id: Uuid,
    pub description: String,
    pub url_detail: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
