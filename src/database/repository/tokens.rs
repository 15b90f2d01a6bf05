use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::token::{PasswordResetToken, RefreshToken};

pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_refresh(
        &self,
        user_id: Uuid,
        jwt_token_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, DatabaseError> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (id, user_id, jwt_token_id, token_hash, is_valid, expires_at)
             VALUES ($1, $2, $3, $4, TRUE, $5)
             RETURNING id, user_id, jwt_token_id, token_hash, is_valid, expires_at, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(jwt_token_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    pub async fn find_refresh_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, DatabaseError> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, jwt_token_id, token_hash, is_valid, expires_at, created_at
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    /// Returns false when the row was already invalid, so concurrent refreshes
    /// of the same token cannot both succeed.
    pub async fn invalidate(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE refresh_tokens SET is_valid = FALSE WHERE id = $1 AND is_valid")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn invalidate_chain(&self, jwt_token_id: &str) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE refresh_tokens SET is_valid = FALSE WHERE jwt_token_id = $1 AND is_valid")
            .bind(jwt_token_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn invalidate_all_for_user(&self, user_id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE refresh_tokens SET is_valid = FALSE WHERE user_id = $1 AND is_valid")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete rows that can no longer be exchanged
    pub async fn purge_refresh(&self, older_than: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at < now() OR (NOT is_valid AND created_at < $1)",
        )
        .bind(older_than)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Unused, unexpired reset token belonging to `user_id`
    pub async fn find_active_reset(
        &self,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, DatabaseError> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token_hash, expires_at, used_at FROM password_reset_tokens
             WHERE user_id = $1 AND token_hash = $2 AND used_at IS NULL AND expires_at > now()",
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(token)
    }

    pub async fn mark_reset_used(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE password_reset_tokens SET used_at = now() WHERE id = $1 AND used_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
