// handlers/protected/tutor_profile.rs - GET/PUT /api/v1/tutor-profile

use axum::{extract::State, Json};

use crate::database::models::tutor::{Tutor, TutorProfileInput};
use crate::database::repository::TutorRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::types::Role;

/// GET /api/v1/tutor-profile - Tutor's own profile, including request status
pub async fn get(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Tutor> {
    auth.require_role(&[Role::Tutor])?;
    let tutor = TutorRepository::new(state.pool.clone())
        .find(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tutor profile not found"))?;
    Ok(ApiResponse::success(tutor))
}

/// PUT /api/v1/tutor-profile
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<TutorProfileInput>,
) -> ApiResult<Tutor> {
    auth.require_role(&[Role::Tutor])?;
    body.validate().map_err(|(field, msg)| ApiError::invalid_field(field, msg))?;
    let tutor = TutorRepository::new(state.pool.clone()).update_profile(auth.user_id, &body).await?;
    Ok(ApiResponse::success(tutor))
}
