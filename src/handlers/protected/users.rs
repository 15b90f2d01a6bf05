// handlers/protected/users.rs - the signed-in user's own account

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;
use crate::database::models::user::{User, UserProfileUpdate};
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// GET /api/v1/users/me
pub async fn me(ValidatedUser(user): ValidatedUser) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/users/me - Update name, phone, address or image
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UserProfileUpdate>,
) -> ApiResult<User> {
    if let Some(name) = &body.full_name {
        validation::max_len("fullName", name, 100)?;
    }
    let user = UserRepository::new(state.pool.clone()).update_profile(auth.user_id, &body).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/users/me/password - Change password; every session must sign in again
pub async fn change_password(
    State(state): State<AppState>,
    ValidatedUser(user): ValidatedUser,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    let current_ok = user
        .password_hash
        .as_deref()
        .map(|hash| verify_password(&body.current_password, hash))
        .unwrap_or(false);
    if !current_ok {
        return Err(ApiError::invalid_field("currentPassword", "is incorrect"));
    }
    if body.current_password == body.new_password {
        return Err(ApiError::invalid_field("newPassword", "must differ from the current password"));
    }

    let hash = hash_password(&body.new_password)?;
    UserRepository::new(state.pool.clone()).set_password_hash(user.id, &hash).await?;
    TokenService::new(state.pool.clone()).revoke_all_for_user(user.id).await?;
    tracing::info!("User {} changed password", user.id);

    Ok(ApiResponse::success(()))
}
