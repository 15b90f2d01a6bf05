use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per issued refresh token. Tokens from the same login share
/// `jwt_token_id`, which is also the `jti` of their access tokens.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub jwt_token_id: String,
    pub token_hash: String,
    pub is_valid: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}
