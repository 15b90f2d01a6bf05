use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{decode_jwt, generate_jwt, hash_token, new_opaque_token, Claims, TokenError};
use crate::config;
use crate::database::models::token::RefreshToken;
use crate::database::models::user::User;
use crate::database::repository::{TokenRepository, UserRepository};

/// Access/refresh pair handed to clients and sent back on refresh and revoke
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Outcome of checking a stored refresh row against the presented access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Rotate,
    /// Row belongs to another chain or user; only that row is invalidated
    RejectMismatch,
    /// Row was already rotated or revoked; the whole chain is invalidated
    RejectReuse,
    RejectExpired,
}

pub fn evaluate_refresh(row: &RefreshToken, claims: &Claims, now: DateTime<Utc>) -> RefreshDecision {
    if row.jwt_token_id != claims.jti || row.user_id != claims.sub {
        return RefreshDecision::RejectMismatch;
    }
    if !row.is_valid {
        return RefreshDecision::RejectReuse;
    }
    if row.expires_at <= now {
        return RefreshDecision::RejectExpired;
    }
    RefreshDecision::Rotate
}

pub struct TokenService {
    tokens: TokenRepository,
    users: UserRepository,
}

impl TokenService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tokens: TokenRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Start a new chain for a fresh login
    pub async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        if user.is_locked_out {
            return Err(TokenError::AccountLocked);
        }
        let jti = Uuid::new_v4().to_string();
        self.issue_in_chain(user, &jti).await
    }

    async fn issue_in_chain(&self, user: &User, jti: &str) -> Result<TokenPair, TokenError> {
        let claims = Claims::new(user.id, user.email.as_str(), user.role, jti);
        let access_token = generate_jwt(&claims)?;

        let refresh_token = new_opaque_token();
        let expires_at = Utc::now() + Duration::days(config::config().security.refresh_token_days);
        self.tokens
            .insert_refresh(user.id, jti, &hash_token(&refresh_token), expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Signature-checked claims plus the stored row, after the mismatch check
    async fn load_pair(&self, pair: &TokenPair) -> Result<(Claims, RefreshToken), TokenError> {
        let claims = decode_jwt(&pair.access_token, false)?;
        let row = self
            .tokens
            .find_refresh_by_hash(&hash_token(&pair.refresh_token))
            .await?
            .ok_or(TokenError::RefreshRejected)?;

        if evaluate_refresh(&row, &claims, Utc::now()) == RefreshDecision::RejectMismatch {
            tracing::warn!("Refresh token {} presented with a foreign access token", row.id);
            self.tokens.invalidate(row.id).await?;
            return Err(TokenError::RefreshRejected);
        }

        Ok((claims, row))
    }

    pub async fn refresh(&self, pair: &TokenPair) -> Result<TokenPair, TokenError> {
        let (claims, row) = self.load_pair(pair).await?;

        match evaluate_refresh(&row, &claims, Utc::now()) {
            RefreshDecision::Rotate => {}
            RefreshDecision::RejectReuse => {
                let revoked = self.tokens.invalidate_chain(&row.jwt_token_id).await?;
                tracing::warn!(
                    "Refresh token reuse detected for user {}; invalidated {} tokens in chain {}",
                    row.user_id,
                    revoked,
                    row.jwt_token_id
                );
                return Err(TokenError::RefreshRejected);
            }
            RefreshDecision::RejectExpired | RefreshDecision::RejectMismatch => {
                self.tokens.invalidate(row.id).await?;
                return Err(TokenError::RefreshRejected);
            }
        }

        let user = self
            .users
            .find_by_id(row.user_id)
            .await?
            .ok_or(TokenError::RefreshRejected)?;
        if user.is_locked_out {
            self.tokens.invalidate_chain(&row.jwt_token_id).await?;
            return Err(TokenError::AccountLocked);
        }

        // A concurrent refresh of the same token already won the rotation
        if !self.tokens.invalidate(row.id).await? {
            return Err(TokenError::RefreshRejected);
        }

        self.issue_in_chain(&user, &row.jwt_token_id).await
    }

    /// Logout: end the chain the pair belongs to
    pub async fn revoke(&self, pair: &TokenPair) -> Result<(), TokenError> {
        let (_, row) = self.load_pair(pair).await?;
        self.tokens.invalidate_chain(&row.jwt_token_id).await?;
        tracing::info!("Revoked refresh chain {} for user {}", row.jwt_token_id, row.user_id);
        Ok(())
    }

    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, TokenError> {
        Ok(self.tokens.invalidate_all_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn row(user_id: Uuid, jti: &str, is_valid: bool, expires_in: Duration) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            user_id,
            jwt_token_id: jti.to_string(),
            token_hash: hash_token("opaque"),
            is_valid,
            expires_at: Utc::now() + expires_in,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn valid_row_in_same_chain_rotates() {
        let user = Uuid::new_v4();
        let claims = Claims::new(user, "p@example.com", Role::Parent, "chain");
        let stored = row(user, "chain", true, Duration::days(1));
        assert_eq!(evaluate_refresh(&stored, &claims, Utc::now()), RefreshDecision::Rotate);
    }

    #[test]
    fn rotated_row_signals_reuse() {
        let user = Uuid::new_v4();
        let claims = Claims::new(user, "p@example.com", Role::Parent, "chain");
        let stored = row(user, "chain", false, Duration::days(1));
        assert_eq!(evaluate_refresh(&stored, &claims, Utc::now()), RefreshDecision::RejectReuse);
    }

    #[test]
    fn foreign_chain_or_user_is_a_mismatch() {
        let user = Uuid::new_v4();
        let claims = Claims::new(user, "p@example.com", Role::Parent, "chain");

        let other_chain = row(user, "other", true, Duration::days(1));
        assert_eq!(evaluate_refresh(&other_chain, &claims, Utc::now()), RefreshDecision::RejectMismatch);

        let other_user = row(Uuid::new_v4(), "chain", true, Duration::days(1));
        assert_eq!(evaluate_refresh(&other_user, &claims, Utc::now()), RefreshDecision::RejectMismatch);

        // mismatch wins over reuse so a stolen rotated token cannot burn someone else's chain
        let stale_foreign = row(user, "other", false, Duration::days(1));
        assert_eq!(evaluate_refresh(&stale_foreign, &claims, Utc::now()), RefreshDecision::RejectMismatch);
    }

    #[test]
    fn expired_row_is_rejected() {
        let user = Uuid::new_v4();
        let claims = Claims::new(user, "t@example.com", Role::Tutor, "chain");
        let stored = row(user, "chain", true, Duration::seconds(-1));
        assert_eq!(evaluate_refresh(&stored, &claims, Utc::now()), RefreshDecision::RejectExpired);
    }

    #[test]
    fn token_pair_uses_camel_case() {
        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
        };
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
    }
}
