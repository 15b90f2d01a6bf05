use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::models::user::User;
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;
use uuid::Uuid;

/// Current user row, loaded after the JWT has been verified
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

/// Middleware that checks the JWT subject against the users table.
/// Ensures the account still exists, is not locked, and still holds the role in the token.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = load_active_user(&state, auth_user.user_id, auth_user.role).await?;

    tracing::debug!("User validation successful: {} ({})", user.email, user.role);

    request.extensions_mut().insert(ValidatedUser(user));

    Ok(next.run(request).await)
}

/// Load the account behind a verified token. Missing accounts are 401;
/// locked accounts and stale roles are 403.
pub async fn load_active_user(state: &AppState, user_id: Uuid, token_role: Role) -> Result<User, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("User validation failed: user {} no longer exists", user_id);
            ApiError::unauthorized("User no longer exists")
        })?;

    if user.is_locked_out {
        tracing::warn!("User validation failed: user {} is locked", user.id);
        return Err(ApiError::forbidden("Account is locked"));
    }

    if user.role != token_role {
        tracing::warn!(
            "User validation failed: token role {} does not match stored role {} for {}",
            token_role,
            user.role,
            user.id
        );
        return Err(ApiError::forbidden("User role has changed, please sign in again"));
    }

    Ok(user)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ValidatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ValidatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
