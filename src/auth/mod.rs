pub mod google;
pub mod password;
pub mod refresh;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;
use crate::types::Role;

pub use refresh::{TokenPair, TokenService};

/// Access token claims. `jti` identifies the refresh chain the token belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub jti: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role, jti: impl Into<String>) -> Self {
        let security = &config::config().security;
        let now = Utc::now();
        let exp = (now + Duration::minutes(security.access_token_minutes)).timestamp();

        Self {
            sub: user_id,
            email: email.into(),
            role,
            jti: jti.into(),
            iss: security.jwt_issuer.clone(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Token has expired")]
    Expired,
    #[error("Refresh token is not valid")]
    RefreshRejected,
    #[error("Account is locked")]
    AccountLocked,
    #[error(transparent)]
    Database(#[from] crate::database::DatabaseError),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key).map_err(|e| TokenError::Generation(e.to_string()))
}

/// Decode and verify an access token. The refresh flow passes
/// `validate_exp = false` so an expired access token can still be exchanged.
pub fn decode_jwt(token: &str, validate_exp: bool) -> Result<Claims, TokenError> {
    let security = &config::config().security;

    if security.jwt_secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = validate_exp;
    validation.set_issuer(&[security.jwt_issuer.as_str()]);
    if !validate_exp {
        validation.required_spec_claims.remove("exp");
    }

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

/// 32 random bytes, URL-safe base64. Used for refresh and password-reset tokens.
pub fn new_opaque_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Opaque tokens are stored only as their SHA-256 hex digest
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trip_keeps_chain_id() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "parent@example.com", Role::Parent, "chain-1");
        let token = generate_jwt(&claims).unwrap();

        let decoded = decode_jwt(&token, true).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.jti, "chain-1");
        assert_eq!(decoded.role, Role::Parent);
    }

    #[test]
    fn expired_tokens_decode_only_without_exp_validation() {
        let mut claims = Claims::new(Uuid::new_v4(), "tutor@example.com", Role::Tutor, "chain-2");
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&claims).unwrap();

        assert!(matches!(decode_jwt(&token, true), Err(TokenError::Expired)));
        assert_eq!(decode_jwt(&token, false).unwrap().jti, "chain-2");
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let claims = Claims::new(Uuid::new_v4(), "staff@example.com", Role::Staff, "chain-3");
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(matches!(decode_jwt(&token, false), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn opaque_tokens_are_unique_and_hashed() {
        let a = new_opaque_token();
        let b = new_opaque_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert_eq!(hash_token(&a).len(), 64);
        assert_eq!(hash_token(&a), hash_token(&a));
    }
}
