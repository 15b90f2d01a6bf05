// handlers/elevated/users.rs - account administration

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::TokenService;
use crate::database::models::user::{NewUser, User};
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, PageQuery};
use crate::state::AppState;
use crate::types::Role;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
}

impl UserListQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
}

/// GET /api/v1/admin/users - Search accounts by name/email and role
pub async fn list(State(state): State<AppState>, Query(query): Query<UserListQuery>) -> ApiResult<Vec<User>> {
    let page = query.page().resolve();
    let search = query.search.as_deref().filter(|s| !s.trim().is_empty());
    let (users, total) = UserRepository::new(state.pool.clone())
        .list(search, query.role, page)
        .await?;
    Ok(ApiResponse::paged(users, page.pagination(total)))
}

/// GET /api/v1/admin/users/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<User> {
    let user = UserRepository::new(state.pool.clone()).get(id).await?;
    Ok(ApiResponse::success(user))
}

/// Staff accounts are locked and unlocked by administrators only
fn ensure_may_manage(actor: Role, target: Role) -> Result<(), ApiError> {
    if target.is_staff() && actor != Role::Admin {
        return Err(ApiError::forbidden("Only administrators can lock or unlock staff accounts"));
    }
    Ok(())
}

/// PUT /api/v1/admin/users/:id/lock - Lock an account and end its sessions
pub async fn lock(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<User> {
    if id == auth.user_id {
        return Err(ApiError::bad_request("You cannot lock your own account"));
    }
    let users = UserRepository::new(state.pool.clone());
    let target = users.get(id).await?;
    ensure_may_manage(auth.role, target.role)?;

    let user = users.set_locked(id, true).await?;
    let revoked = TokenService::new(state.pool.clone()).revoke_all_for_user(id).await?;
    tracing::info!("User {} locked by {}; {} refresh tokens revoked", id, auth.user_id, revoked);
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/admin/users/:id/unlock
pub async fn unlock(State(state): State<AppState>, auth: AuthUser, Path(id): Path<Uuid>) -> ApiResult<User> {
    let users = UserRepository::new(state.pool.clone());
    let target = users.get(id).await?;
    ensure_may_manage(auth.role, target.role)?;

    let user = users.set_locked(id, false).await?;
    tracing::info!("User {} unlocked by {}", id, auth.user_id);
    Ok(ApiResponse::success(user))
}

/// POST /api/v1/admin/users - Admin creates a Staff or Manager account
pub async fn create_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateStaffRequest>,
) -> ApiResult<User> {
    auth.require_role(&[Role::Admin])?;
    if !matches!(body.role, Role::Staff | Role::Manager) {
        return Err(ApiError::invalid_field("role", "must be Staff or Manager"));
    }
    let email = validation::email(&body.email)?;
    let full_name = validation::max_len("fullName", &body.full_name, 100)?.to_string();
    let password_hash = hash_password(&body.password)?;

    let user = UserRepository::new(state.pool.clone())
        .insert(NewUser {
            email,
            full_name,
            phone_number: body.phone_number,
            address: None,
            image_url: None,
            password_hash: Some(password_hash),
            role: body.role,
        })
        .await?;
    tracing::info!("{} account {} created by {}", user.role, user.id, auth.user_id);

    Ok(ApiResponse::created(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_cannot_manage_other_staff_accounts() {
        assert!(ensure_may_manage(Role::Staff, Role::Manager).is_err());
        assert!(ensure_may_manage(Role::Staff, Role::Admin).is_err());
        assert!(ensure_may_manage(Role::Manager, Role::Staff).is_err());
    }

    #[test]
    fn admins_manage_everyone_and_staff_manage_customers() {
        assert!(ensure_may_manage(Role::Admin, Role::Manager).is_ok());
        assert!(ensure_may_manage(Role::Staff, Role::Parent).is_ok());
        assert!(ensure_may_manage(Role::Staff, Role::Tutor).is_ok());
    }
}
